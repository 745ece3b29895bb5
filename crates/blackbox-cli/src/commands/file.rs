// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use clap::Subcommand;

use super::{finish, log_outcome, Context};

#[derive(Debug, Clone, Subcommand)]
pub enum FileCommand {
	/// Register files and encrypt them
	Add {
		/// Securely delete the plaintext after encrypting
		#[arg(long)]
		shred: bool,
		#[arg(required = true)]
		names: Vec<String>,
	},
	/// Print every registered file
	List,
	/// Unregister files and delete their ciphertexts
	Remove {
		#[arg(required = true)]
		names: Vec<String>,
	},
}

pub async fn run(command: FileCommand, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	match command {
		FileCommand::Add { shred, names } => {
			let names = ctx.names(&bx, &names)?;
			let outcome = bx.file_add(&names, shred).await?;
			log_outcome("file add", &outcome);
		}
		FileCommand::List => {
			for name in bx.file_list()? {
				println!("{name}");
			}
		}
		FileCommand::Remove { names } => {
			let names = ctx.names(&bx, &names)?;
			let outcome = bx.file_remove(&names).await?;
			log_outcome("file remove", &outcome);
		}
	}
	finish(&mut bx).await
}
