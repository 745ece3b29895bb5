// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Encryption state of a registered file, derived from its plaintext and
//! ciphertext on disk.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use blackbox_common_backend::ciphertext_path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatus {
	/// Plaintext is at least as new as the ciphertext.
	Decrypted,
	/// Ciphertext is newer than the plaintext.
	Encrypted,
	/// Only the ciphertext exists.
	Shredded,
	/// Only the plaintext exists.
	GpgMissing,
	BothMissing,
	GpgError,
	PlainError,
	/// Named explicitly but not in the files registry.
	NotReg,
}

impl FileStatus {
	pub const ALL: [FileStatus; 8] = [
		FileStatus::Decrypted,
		FileStatus::Encrypted,
		FileStatus::Shredded,
		FileStatus::GpgMissing,
		FileStatus::BothMissing,
		FileStatus::GpgError,
		FileStatus::PlainError,
		FileStatus::NotReg,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FileStatus::Decrypted => "DECRYPTED",
			FileStatus::Encrypted => "ENCRYPTED",
			FileStatus::Shredded => "SHREDDED",
			FileStatus::GpgMissing => "GPGMISSING",
			FileStatus::BothMissing => "BOTHMISSING",
			FileStatus::GpgError => "GPGERROR",
			FileStatus::PlainError => "PLAINERROR",
			FileStatus::NotReg => "NOTREG",
		}
	}
}

impl fmt::Display for FileStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names: Vec<_> = FileStatus::ALL.iter().map(|s| s.as_str()).collect();
		write!(f, "unknown status {:?} (expected one of {})", self.0, names.join(", "))
	}
}

impl std::error::Error for UnknownStatus {}

impl FromStr for FileStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		FileStatus::ALL
			.into_iter()
			.find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| UnknownStatus(s.to_string()))
	}
}

/// Result of classifying one file. `error` is set only for the two error
/// statuses.
#[derive(Debug)]
pub struct Classification {
	pub status: FileStatus,
	pub error: Option<io::Error>,
}

impl Classification {
	fn ok(status: FileStatus) -> Self {
		Self {
			status,
			error: None,
		}
	}
}

/// Classifies `plain` by stat-ing it and `plain.gpg`.
pub fn classify(plain: &Path) -> Classification {
	let plain_meta = std::fs::metadata(plain);
	let cipher_meta = std::fs::metadata(ciphertext_path(plain));

	match (plain_meta, cipher_meta) {
		(Ok(p), Ok(c)) => match (p.modified(), c.modified()) {
			(Ok(pt), Ok(ct)) if pt < ct => Classification::ok(FileStatus::Encrypted),
			(Ok(_), Ok(_)) => Classification::ok(FileStatus::Decrypted),
			(Err(e), _) => Classification {
				status: FileStatus::PlainError,
				error: Some(e),
			},
			(_, Err(e)) => Classification {
				status: FileStatus::GpgError,
				error: Some(e),
			},
		},
		(Err(pe), Err(ce))
			if pe.kind() == io::ErrorKind::NotFound && ce.kind() == io::ErrorKind::NotFound =>
		{
			Classification::ok(FileStatus::BothMissing)
		}
		(_, Err(ce)) if ce.kind() == io::ErrorKind::NotFound => {
			Classification::ok(FileStatus::GpgMissing)
		}
		(_, Err(ce)) => Classification {
			status: FileStatus::GpgError,
			error: Some(ce),
		},
		(Err(pe), Ok(_)) if pe.kind() == io::ErrorKind::NotFound => {
			Classification::ok(FileStatus::Shredded)
		}
		(Err(pe), Ok(_)) => Classification {
			status: FileStatus::PlainError,
			error: Some(pe),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs::{self, File};
	use std::time::{Duration, SystemTime};
	use tempfile::TempDir;

	fn write_with_mtime(path: &Path, mtime: SystemTime) {
		fs::write(path, "x").unwrap();
		File::options()
			.write(true)
			.open(path)
			.unwrap()
			.set_modified(mtime)
			.unwrap();
	}

	#[test]
	fn test_status_names_round_trip() {
		for status in FileStatus::ALL {
			assert_eq!(status.to_string().parse::<FileStatus>().unwrap(), status);
		}
		assert_eq!("shredded".parse::<FileStatus>().unwrap(), FileStatus::Shredded);
		assert!("MISSING".parse::<FileStatus>().is_err());
	}

	#[test]
	fn test_status_serializes_upper_case() {
		assert_eq!(
			serde_json::to_string(&FileStatus::GpgMissing).unwrap(),
			"\"GPGMISSING\""
		);
	}

	/// Test: which side is newer decides ENCRYPTED versus DECRYPTED, and a tie
	/// counts as DECRYPTED.
	///
	/// Why this test is important: A plaintext edited after encryption must
	/// never be reported as safely encrypted.
	#[test]
	fn test_classify_by_mtime() {
		let temp = TempDir::new().unwrap();
		let plain = temp.path().join("secret.txt");
		let cipher = ciphertext_path(&plain);
		let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

		write_with_mtime(&plain, t0);
		write_with_mtime(&cipher, t0 + Duration::from_secs(5));
		assert_eq!(classify(&plain).status, FileStatus::Encrypted);

		write_with_mtime(&plain, t0 + Duration::from_secs(10));
		assert_eq!(classify(&plain).status, FileStatus::Decrypted);

		write_with_mtime(&cipher, t0 + Duration::from_secs(10));
		assert_eq!(classify(&plain).status, FileStatus::Decrypted);
	}

	#[test]
	fn test_classify_missing_sides() {
		let temp = TempDir::new().unwrap();
		let plain = temp.path().join("a");

		assert_eq!(classify(&plain).status, FileStatus::BothMissing);

		fs::write(&plain, "x").unwrap();
		assert_eq!(classify(&plain).status, FileStatus::GpgMissing);

		fs::remove_file(&plain).unwrap();
		fs::write(ciphertext_path(&plain), "x").unwrap();
		let c = classify(&plain);
		assert_eq!(c.status, FileStatus::Shredded);
		assert!(c.error.is_none());
	}

	/// Test: an unreadable parent directory yields an error status carrying
	/// the underlying error.
	///
	/// Why this test is important: Status must report why it could not decide
	/// instead of guessing a state.
	#[cfg(unix)]
	#[test]
	fn test_classify_permission_error() {
		use std::os::unix::fs::PermissionsExt;

		if unsafe { libc::geteuid() } == 0 {
			// root ignores directory permissions
			return;
		}
		let temp = TempDir::new().unwrap();
		let dir = temp.path().join("locked");
		fs::create_dir(&dir).unwrap();
		fs::write(dir.join("a"), "x").unwrap();
		fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

		let c = classify(&dir.join("a"));
		fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

		assert_eq!(c.status, FileStatus::GpgError);
		assert!(c.error.is_some());
	}
}
