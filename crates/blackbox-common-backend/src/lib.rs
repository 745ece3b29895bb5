// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capability traits for the two external collaborators of blackbox: the
//! cipher backend ([`Crypter`]) and the repository backend ([`Vcs`]), plus the
//! [`Catalog`] they are registered in.

mod catalog;
mod crypter;
mod error;
pub mod mock;
mod plaintext;
mod vcs;

pub use catalog::{
	discover_vcs, BackendDescriptor, BackendOptions, Catalog, Constructor, CrypterCatalog,
	VcsCatalog,
};
pub use crypter::{ciphertext_path, Crypter, CIPHERTEXT_SUFFIX};
pub use error::{BackendError, Result};
pub use plaintext::Plaintext;
pub use vcs::Vcs;
