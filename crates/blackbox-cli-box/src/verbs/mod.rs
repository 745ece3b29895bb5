// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The user-facing operations, one module per verb family. Each adds
//! methods to [`crate::Blackbox`].

mod admin;
mod decrypt;
mod encrypt;
mod file;
mod info;
mod init;
mod reencrypt;
mod shred;
mod status;
mod view;

pub use info::InfoReport;
pub use init::{INIT_IGNORE_PATTERNS, INIT_TITLE};
pub use reencrypt::REENCRYPT_WARNING;
pub use status::{render_status, StatusEntry};
