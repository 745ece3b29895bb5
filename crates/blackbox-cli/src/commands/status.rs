// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use blackbox_cli_box::{render_status, FileStatus};

use super::Context;

#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
	/// Report every registered file (the default when no names are given)
	#[arg(long, conflicts_with = "names")]
	pub all: bool,

	/// Print only the file names
	#[arg(long)]
	pub name_only: bool,

	/// Only report files in this state, e.g. DECRYPTED or SHREDDED
	#[arg(long = "type", value_name = "STATUS")]
	pub status_type: Option<FileStatus>,

	/// Print the report as JSON
	#[arg(long, conflicts_with = "name_only")]
	pub json: bool,

	pub names: Vec<String>,
}

pub async fn run(args: StatusArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.names(&bx, &args.names)?;
	let entries = bx.status(&names, args.status_type)?;
	if args.json {
		println!("{}", serde_json::to_string_pretty(&entries)?);
	} else {
		print!("{}", render_status(&entries, args.name_only));
	}
	Ok(())
}
