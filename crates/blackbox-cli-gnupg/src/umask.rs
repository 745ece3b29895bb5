// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Sets the process umask for its lifetime and restores the previous one on
/// drop. Child processes spawned while it is alive inherit the mask.
pub struct UmaskGuard {
	#[cfg(unix)]
	previous: libc::mode_t,
}

impl UmaskGuard {
	#[cfg(unix)]
	pub fn set(mask: u32) -> Self {
		// SAFETY: umask only swaps the process file-mode creation mask.
		let previous = unsafe { libc::umask(mask as libc::mode_t) };
		Self { previous }
	}

	#[cfg(not(unix))]
	pub fn set(_mask: u32) -> Self {
		Self {}
	}
}

impl Drop for UmaskGuard {
	#[cfg(unix)]
	fn drop(&mut self) {
		// SAFETY: see UmaskGuard::set.
		unsafe {
			libc::umask(self.previous);
		}
	}

	#[cfg(not(unix))]
	fn drop(&mut self) {}
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;
	use std::fs;
	use std::os::unix::fs::PermissionsExt;
	use tempfile::TempDir;

	/// Test: files created under the guard get the requested mask, and the old
	/// mask comes back afterwards.
	///
	/// Why this test is important: Decrypted secrets must not be world-readable,
	/// and a leaked umask would affect every later file the process creates.
	#[test]
	fn test_umask_guard_applies_and_restores() {
		let temp = TempDir::new().unwrap();
		let original = unsafe { libc::umask(0o022) };
		unsafe { libc::umask(original) };

		{
			let _guard = UmaskGuard::set(0o077);
			fs::write(temp.path().join("secret"), "x").unwrap();
		}
		let mode = fs::metadata(temp.path().join("secret"))
			.unwrap()
			.permissions()
			.mode();
		assert_eq!(mode & 0o077, 0);

		let after = unsafe { libc::umask(original) };
		assert_eq!(after, original);
	}
}
