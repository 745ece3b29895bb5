// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registry files for blackbox.
//!
//! A registry is a strictly sorted list of unique lines: the administrators
//! allowed to decrypt (`blackbox-admins.txt`) and the secret files under
//! management (`blackbox-files.txt`).

mod error;
mod lines;
mod sorted;

pub use error::{RegistryError, Result};
pub use lines::{append_lines, touch};
pub use sorted::{contains_sorted, parse, validate_entry, SortedFile, REGISTRY_MODE};

/// File name of the administrators registry inside the config directory.
pub const ADMINS_FILE: &str = "blackbox-admins.txt";

/// File name of the files registry inside the config directory.
pub const FILES_FILE: &str = "blackbox-files.txt";
