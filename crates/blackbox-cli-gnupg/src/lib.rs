// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod gnupg;
mod umask;

use blackbox_common_backend::CrypterCatalog;

pub use gnupg::{GnupgCrypter, GNUPG_NAME, GNUPG_PRIORITY};
pub use umask::UmaskGuard;

/// Registers the cipher backends shipped with blackbox.
pub fn register(catalog: &mut CrypterCatalog) {
	catalog.register(GNUPG_NAME, GNUPG_PRIORITY, gnupg::new_gnupg);
}
