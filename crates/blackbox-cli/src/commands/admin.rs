// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::Subcommand;

use super::{finish, log_outcome, Context};

#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
	/// Trust a new identity to decrypt the repository's secrets
	Add {
		/// GPG identity, usually an email address
		identity: String,
		/// GnuPG home to export the key from (default: your own keyring)
		keydir: Option<PathBuf>,
	},
	/// Print every admin
	List,
	/// Stop trusting identities (files must be re-encrypted afterwards)
	Remove {
		#[arg(required = true)]
		identities: Vec<String>,
	},
}

pub async fn run(command: AdminCommand, ctx: &Context) -> anyhow::Result<()> {
	let mut bx = ctx.open().await?;
	match command {
		AdminCommand::Add { identity, keydir } => {
			let keydir = keydir.map(|dir| ctx.cwd.join(dir));
			bx.admin_add(&identity, keydir.as_deref()).await?;
		}
		AdminCommand::List => {
			for admin in bx.admin_list()? {
				println!("{admin}");
			}
		}
		AdminCommand::Remove { identities } => {
			let outcome = bx.admin_remove(&identities).await?;
			log_outcome("admin remove", &outcome);
		}
	}
	finish(&mut bx).await
}
