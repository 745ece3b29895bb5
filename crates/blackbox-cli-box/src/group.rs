// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;
use std::path::Path;

use crate::error::{BoxError, Result};

/// Resolves a group given by number or by name.
#[cfg(unix)]
pub fn resolve_group(spec: &str) -> Result<u32> {
	use std::ffi::CString;

	let spec = spec.trim();
	if spec.is_empty() {
		return Err(BoxError::UnknownGroup(spec.to_string()));
	}
	if let Ok(gid) = spec.parse::<u32>() {
		return Ok(gid);
	}

	let name = CString::new(spec).map_err(|_| BoxError::UnknownGroup(spec.to_string()))?;
	let mut buf_len = 1024usize;
	loop {
		let mut buf = vec![0 as libc::c_char; buf_len];
		// SAFETY: zeroed is a valid bit pattern for the plain C struct.
		let mut group: libc::group = unsafe { std::mem::zeroed() };
		let mut found: *mut libc::group = std::ptr::null_mut();
		// SAFETY: every pointer refers to live, correctly sized storage.
		let rc = unsafe {
			libc::getgrnam_r(
				name.as_ptr(),
				&mut group,
				buf.as_mut_ptr(),
				buf.len(),
				&mut found,
			)
		};
		if rc == libc::ERANGE && buf_len < (1 << 20) {
			buf_len *= 4;
			continue;
		}
		if rc != 0 || found.is_null() {
			return Err(BoxError::UnknownGroup(spec.to_string()));
		}
		return Ok(group.gr_gid);
	}
}

#[cfg(not(unix))]
pub fn resolve_group(spec: &str) -> Result<u32> {
	Err(BoxError::UnknownGroup(spec.to_string()))
}

/// Hands `path` to `gid` and, with `group_read`, lets the group read it.
#[cfg(unix)]
pub fn apply_group(path: &Path, gid: u32, group_read: bool) -> io::Result<()> {
	use std::os::unix::fs::PermissionsExt;

	std::os::unix::fs::chown(path, None, Some(gid))?;
	if group_read {
		let mut perms = std::fs::metadata(path)?.permissions();
		perms.set_mode(perms.mode() | 0o040);
		std::fs::set_permissions(path, perms)?;
	}
	Ok(())
}

#[cfg(not(unix))]
pub fn apply_group(_path: &Path, _gid: u32, _group_read: bool) -> io::Result<()> {
	Err(io::Error::new(io::ErrorKind::Unsupported, "groups are not supported on this platform"))
}
