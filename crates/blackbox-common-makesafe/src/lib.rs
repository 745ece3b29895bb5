// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Safe renderings of untrusted file names.
//!
//! [`redact`] produces text that is safe to show in logs and commit messages:
//! anything unprintable becomes `X`. [`shell`] produces text that, pasted into
//! a POSIX shell, yields exactly the original name as one argument.

use std::fmt::Write;

/// Maximum number of names [`first_few`] shows before truncating.
const FIRST_FEW_ITEMS: usize = 2;

/// Joined length at which [`first_few`] starts truncating.
const FIRST_FEW_LEN: usize = 70;

/// Renders `tainted` for human display.
///
/// Single quotes and unprintable characters become `X` and the result is
/// wrapped as `"..."(redacted)`. Otherwise, names containing a space or a
/// double quote are wrapped in double quotes (with `"` escaped).
pub fn redact(tainted: &str) -> String {
	if tainted.is_empty() {
		return r#""""#.to_string();
	}

	let mut out = String::with_capacity(tainted.len() + 10);
	let mut redacted = false;
	let mut needs_quote = false;

	for c in tainted.chars() {
		match c {
			' ' => {
				out.push(c);
				needs_quote = true;
			}
			'\'' => {
				out.push('X');
				redacted = true;
			}
			'"' => {
				out.push_str("\\\"");
				needs_quote = true;
			}
			c if is_printable(c) => out.push(c),
			_ => {
				out.push('X');
				redacted = true;
			}
		}
	}

	if redacted {
		format!("\"{out}\"(redacted)")
	} else if needs_quote {
		format!("\"{out}\"")
	} else {
		tainted.to_string()
	}
}

pub fn redact_many<S: AsRef<str>>(items: &[S]) -> Vec<String> {
	items.iter().map(|s| redact(s.as_ref())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Protection {
	None,
	SingleQuote,
	DoubleQuote,
}

fn protection(c: char) -> Protection {
	match c {
		'a'..='z' | 'A'..='Z' | '0'..='9' | ',' | '-' | '.' | '/' | '_' => Protection::None,
		'\u{0}'..='\u{1f}' | '\u{7f}' => Protection::DoubleQuote,
		c if !c.is_ascii() => Protection::DoubleQuote,
		_ => Protection::SingleQuote,
	}
}

/// Renders `tainted` so it can be pasted into a shell command line.
///
/// Plain names are returned unchanged. Names with shell metacharacters are
/// single-quoted. Names with control or non-ASCII characters become
/// `$(printf '%q' '...')` with octal escapes.
pub fn shell(tainted: &str) -> String {
	if tainted.is_empty() {
		return r#""""#.to_string();
	}

	let level = tainted
		.chars()
		.map(protection)
		.max()
		.unwrap_or(Protection::None);

	match level {
		Protection::None => tainted.to_string(),
		Protection::SingleQuote => format!("'{}'", tainted.replace('\'', r#"'"'"'"#)),
		Protection::DoubleQuote => {
			let mut out = String::with_capacity(tainted.len() * 2);
			for c in tainted.chars() {
				push_escaped(&mut out, c);
			}
			format!("$(printf '%q' '{out}')")
		}
	}
}

pub fn shell_many<S: AsRef<str>>(items: &[S]) -> Vec<String> {
	items.iter().map(|s| shell(s.as_ref())).collect()
}

fn push_escaped(out: &mut String, c: char) {
	match c {
		'\t' => out.push_str("\\t"),
		'\n' => out.push_str("\\n"),
		'\r' => out.push_str("\\r"),
		'\\' | '\'' => push_octal(out, c),
		c if c.is_ascii_control() || !c.is_ascii() => push_octal(out, c),
		c => out.push(c),
	}
}

fn push_octal(out: &mut String, c: char) {
	let mut buf = [0u8; 4];
	for b in c.encode_utf8(&mut buf).bytes() {
		let _ = write!(out, "\\{b:03o}");
	}
}

/// Joins the first few names, appending ` (and others)` when truncated.
pub fn first_few<S: AsRef<str>>(items: &[S]) -> String {
	first_few_flag(items).0
}

/// Like [`first_few`], also reporting whether truncation happened.
pub fn first_few_flag<S: AsRef<str>>(items: &[S]) -> (String, bool) {
	let joined = items
		.iter()
		.map(|s| s.as_ref())
		.collect::<Vec<_>>()
		.join(" ");
	if items.len() < FIRST_FEW_ITEMS || joined.len() < FIRST_FEW_LEN {
		return (joined, false);
	}

	let head = items[..FIRST_FEW_ITEMS]
		.iter()
		.map(|s| s.as_ref())
		.collect::<Vec<_>>()
		.join(" ");
	(format!("{head} (and others)"), true)
}

/// Letters, marks, numbers, punctuation, symbols and the ASCII space.
fn is_printable(c: char) -> bool {
	if c == ' ' {
		return true;
	}
	if c.is_control() || c.is_whitespace() {
		return false;
	}
	let cp = c as u32;
	let noncharacter = (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE;
	let private_use = (0xE000..=0xF8FF).contains(&cp)
		|| (0xF_0000..=0xF_FFFD).contains(&cp)
		|| (0x10_0000..=0x10_FFFD).contains(&cp);
	let format = matches!(
		cp,
		0xAD | 0x600..=0x605 | 0x61C | 0x6DD | 0x70F | 0x180E | 0x200B..=0x200F | 0x202A..=0x202E
			| 0x2060..=0x2064 | 0x2066..=0x206F | 0xFEFF | 0xFFF9..=0xFFFB
	);
	!(noncharacter || private_use || format)
}
