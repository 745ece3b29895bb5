// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use super::{finish, log_outcome, Context, Selection};

#[derive(Debug, Clone, clap::Args)]
pub struct DecryptArgs {
	#[command(flatten)]
	pub selection: Selection,

	/// Warn about gpg-agent before decrypting (default: on with --all)
	#[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub agentcheck: Option<bool>,

	/// Give the decrypted files to this group (name or gid)
	#[arg(long)]
	pub group: Option<String>,

	/// Replace plaintext files that already exist
	#[arg(long)]
	pub overwrite: bool,
}

pub async fn run_decrypt(args: DecryptArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.selected(&bx, &args.selection)?;
	let pause = args.agentcheck.unwrap_or(args.selection.all);
	let outcome = bx
		.decrypt(&names, args.overwrite, pause, args.group.as_deref())
		.await?;
	log_outcome("decrypt", &outcome);
	finish(&mut bx).await
}

#[derive(Debug, Clone, clap::Args)]
pub struct EncryptArgs {
	#[command(flatten)]
	pub selection: Selection,

	/// Securely delete the plaintext after encrypting
	#[arg(long)]
	pub shred: bool,
}

pub async fn run_encrypt(args: EncryptArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.selected(&bx, &args.selection)?;
	let outcome = bx.encrypt(&names, args.shred).await?;
	log_outcome("encrypt", &outcome);
	finish(&mut bx).await
}

#[derive(Debug, Clone, clap::Args)]
pub struct ReencryptArgs {
	#[command(flatten)]
	pub selection: Selection,

	/// Shred existing plaintexts instead of asking first
	#[arg(long)]
	pub overwrite: bool,

	/// Warn about gpg-agent before decrypting (default: on with --all)
	#[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub agentcheck: Option<bool>,
}

pub async fn run_reencrypt(args: ReencryptArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.selected(&bx, &args.selection)?;
	let pause = args.agentcheck.unwrap_or(args.selection.all);
	let outcome = bx.reencrypt(&names, args.overwrite, pause).await?;
	log_outcome("reencrypt", &outcome);
	finish(&mut bx).await
}

#[derive(Debug, Clone, clap::Args)]
pub struct ShredArgs {
	#[command(flatten)]
	pub selection: Selection,
}

pub async fn run_shred(args: ShredArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.selected(&bx, &args.selection)?;
	let outcome = bx.shred(&names).await?;
	log_outcome("shred", &outcome);
	finish(&mut bx).await
}
