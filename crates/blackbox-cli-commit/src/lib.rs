// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod error;
mod mode;
mod queue;
mod sink;

pub use error::{CommitError, SinkError};
pub use mode::CommitMode;
pub use queue::{CommitQueue, FlushSummary, PendingCommit, PlannedCommit};
pub use sink::{CommitSink, MockCommitSink, SinkCall};
