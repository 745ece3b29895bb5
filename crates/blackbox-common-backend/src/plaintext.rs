// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use zeroize::Zeroize;

/// Decrypted bytes, zeroized on drop and never printed by `Debug`.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Plaintext {
	bytes: Vec<u8>,
}

impl Plaintext {
	pub fn new(bytes: Vec<u8>) -> Self {
		Self { bytes }
	}

	/// Explicitly access the decrypted bytes.
	pub fn expose(&self) -> &[u8] {
		&self.bytes
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

impl fmt::Debug for Plaintext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Plaintext([REDACTED; {} bytes])", self.bytes.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_debug_is_redacted() {
		let p = Plaintext::new(b"hunter2".to_vec());
		let shown = format!("{p:?}");
		assert!(!shown.contains("hunter2"));
		assert_eq!(shown, "Plaintext([REDACTED; 7 bytes])");
		assert_eq!(p.expose(), b"hunter2");
	}
}
