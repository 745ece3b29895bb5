// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interactive questions asked by the verbs.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

pub trait Prompter: Send {
	/// Asks a yes/no question.
	fn confirm(&mut self, question: &str) -> io::Result<bool>;

	/// Shows a message and waits for the user to press ENTER.
	fn pause(&mut self, message: &str) -> io::Result<()>;
}

/// Asks on stderr and reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
	fn read_line() -> io::Result<String> {
		let mut line = String::new();
		io::stdin().lock().read_line(&mut line)?;
		Ok(line)
	}
}

impl Prompter for StdinPrompter {
	fn confirm(&mut self, question: &str) -> io::Result<bool> {
		let mut stderr = io::stderr().lock();
		write!(stderr, "{question} ")?;
		stderr.flush()?;
		drop(stderr);
		Ok(is_yes(&Self::read_line()?))
	}

	fn pause(&mut self, message: &str) -> io::Result<()> {
		let mut stderr = io::stderr().lock();
		write!(stderr, "{message}")?;
		stderr.flush()?;
		drop(stderr);
		Self::read_line().map(|_| ())
	}
}

/// True for "y" and "yes" in any case.
pub fn is_yes(answer: &str) -> bool {
	matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompter with canned answers, for tests and non-interactive runs.
///
/// Once the answers run out every question is answered "no".
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
	answers: Arc<Mutex<VecDeque<bool>>>,
	/// Every question and pause message shown, in order.
	pub asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
	pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
		Self {
			answers: Arc::new(Mutex::new(answers.into_iter().collect())),
			asked: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn get_asked(&self) -> Vec<String> {
		self.asked.lock().unwrap().clone()
	}
}

impl Prompter for ScriptedPrompter {
	fn confirm(&mut self, question: &str) -> io::Result<bool> {
		self.asked.lock().unwrap().push(question.to_string());
		Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
	}

	fn pause(&mut self, message: &str) -> io::Result<()> {
		self.asked.lock().unwrap().push(message.to_string());
		Ok(())
	}
}

pub const AGENT_NOTICE: &str = "WARNING: You probably want to run gpg-agent as
you will be asked for your passphrase many times.
Example: $ eval $(gpg-agent --daemon)
Press CTRL-C now to stop. ENTER to continue: ";

/// Warns about repeated passphrase prompts before a bulk decrypt, unless an
/// agent is already advertised or the platform provides one.
pub fn agent_notice(prompter: &mut dyn Prompter) -> io::Result<()> {
	if std::env::var_os("GPG_AGENT_INFO").is_some_and(|v| !v.is_empty()) {
		return Ok(());
	}
	if cfg!(target_os = "macos") {
		return Ok(());
	}
	prompter.pause(AGENT_NOTICE)
}
