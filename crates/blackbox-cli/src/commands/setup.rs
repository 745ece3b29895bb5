// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use super::{finish, Context};

#[derive(Debug, Clone, clap::Args)]
pub struct InitArgs {
	/// Answer the confirmation question in advance
	#[arg(value_parser = ["yes"])]
	pub answer: Option<String>,
}

pub async fn run_init(args: InitArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.uninitialized().await?;
	bx.init(args.answer.is_some())?;
	finish(&mut bx).await
}

#[derive(Debug, Clone, clap::Args)]
pub struct InfoArgs {
	/// Print the report as JSON
	#[arg(long)]
	pub json: bool,
}

pub async fn run_info(args: InfoArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let report = bx.info().await;
	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		print!("{report}");
	}
	Ok(())
}

pub async fn run_testing_init(ctx: &Context) -> anyhow::Result<()> {
	let bx = ctx.uninitialized().await?;
	bx.testing_init().await?;
	Ok(())
}
