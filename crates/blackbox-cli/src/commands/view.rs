// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;

use super::{finish, log_outcome, Context, Selection};

#[derive(Debug, Clone, clap::Args)]
pub struct CatArgs {
	/// Files to print
	#[arg(required = true)]
	pub names: Vec<String>,
}

pub async fn run_cat(args: CatArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.names(&bx, &args.names)?;
	let outcome = bx.cat(&names, &mut io::stdout().lock()).await?;
	log_outcome("cat", &outcome);
	Ok(())
}

#[derive(Debug, Clone, clap::Args)]
pub struct DiffArgs {
	#[command(flatten)]
	pub selection: Selection,
}

pub async fn run_diff(args: DiffArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.selected(&bx, &args.selection)?;
	let outcome = bx.diff(&names, &mut io::stdout().lock()).await?;
	log_outcome("diff", &outcome);
	Ok(())
}

#[derive(Debug, Clone, clap::Args)]
pub struct EditArgs {
	/// Files to edit
	#[arg(required = true)]
	pub names: Vec<String>,
}

pub async fn run_edit(args: EditArgs, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	let names = ctx.names(&bx, &args.names)?;
	let outcome = bx.edit(&names).await?;
	log_outcome("edit", &outcome);
	finish(&mut bx).await
}
