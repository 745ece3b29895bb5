// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The blackbox verbs: keeping a registry of secret files in a repository
//! and moving them between plaintext and GPG ciphertext.
//!
//! [`Blackbox`] ties a repository root and config dir to a repository
//! backend and a cipher backend. Bulk verbs keep going past per-file
//! failures and report them in an [`Outcome`]; repository changes are queued
//! on the backend and carried out by [`Blackbox::flush_commits`].

mod blackbox;
pub mod configdir;
mod error;
pub mod group;
mod message;
mod names;
mod outcome;
mod prompt;
mod shred;
mod status;
mod verbs;

pub use blackbox::{Blackbox, BoxSettings};
pub use error::{BoxError, Result};
pub use message::pretty_commit_message;
pub use names::{check_names, check_unique_names, repo_relative};
pub use outcome::{Outcome, Skip};
pub use prompt::{agent_notice, is_yes, Prompter, ScriptedPrompter, StdinPrompter, AGENT_NOTICE};
pub use shred::{Shredder, SHRED_CANDIDATES};
pub use status::{classify, Classification, FileStatus, UnknownStatus};
pub use verbs::{render_status, InfoReport, StatusEntry, INIT_IGNORE_PATTERNS, INIT_TITLE, REENCRYPT_WARNING};
