// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! blackbox - keep GPG-encrypted secrets in a version-controlled repository.
//!
//! Registered files are stored as `<name>.gpg` ciphertext readable by every
//! admin listed in the repository's config dir. Plaintexts stay out of
//! version control.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blackbox_cli_config::{
	load_config_with_cli, parse_octal_umask,
	runtime::{LogFormat, LoggingConfig},
	CliOverrides,
};

mod commands;

use commands::admin::AdminCommand;
use commands::crypt::{DecryptArgs, EncryptArgs, ReencryptArgs, ShredArgs};
use commands::file::FileCommand;
use commands::setup::{InfoArgs, InitArgs};
use commands::status::StatusArgs;
use commands::view::{CatArgs, DiffArgs, EditArgs};

/// blackbox - safely store secrets in a VCS repo
#[derive(Parser, Debug)]
#[command(name = "blackbox", version, about, long_about = None)]
struct Args {
	/// Repository backend (GIT or NONE; detected when unset)
	#[arg(long, global = true)]
	vcs: Option<String>,

	/// Cipher backend
	#[arg(long, global = true)]
	crypto: Option<String>,

	/// Directory holding the registries and keyring
	#[arg(long = "config", global = true, value_name = "DIR")]
	config_dir: Option<PathBuf>,

	/// Path to a blackbox configuration file
	#[arg(long, global = true, value_name = "FILE")]
	config_file: Option<PathBuf>,

	/// Use .blackbox-TEAM as the config dir
	#[arg(long, global = true)]
	team: Option<String>,

	/// Editor command for `blackbox edit`
	#[arg(long, global = true)]
	editor: Option<String>,

	/// Umask applied to decrypted files, in octal
	#[arg(long, global = true, value_parser = parse_octal_umask)]
	umask: Option<u32>,

	/// How queued commits are carried out
	#[arg(long = "commit", global = true, value_parser = ["suggest", "auto"])]
	commit_mode: Option<String>,

	/// Show the backend commands as they run
	#[arg(long, global = true)]
	debug: bool,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long, global = true)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decrypt registered files
	#[command(visible_aliases = ["de", "start"])]
	Decrypt(DecryptArgs),
	/// Encrypt registered files
	#[command(visible_aliases = ["en", "end"])]
	Encrypt(EncryptArgs),
	/// Decrypt if needed, then open files in the editor
	#[command(visible_alias = "vi")]
	Edit(EditArgs),
	/// Print the decrypted contents of files
	Cat(CatArgs),
	/// Show how plaintexts differ from their ciphertexts
	Diff(DiffArgs),
	/// Enable blackbox for this repository
	Init(InitArgs),
	/// Manage the admins who can decrypt
	Admin {
		#[command(subcommand)]
		command: AdminCommand,
	},
	/// Manage the registered files
	File {
		#[command(subcommand)]
		command: FileCommand,
	},
	/// Show how blackbox sees this repository
	Info(InfoArgs),
	/// Securely delete plaintexts
	Shred(ShredArgs),
	/// Report the state of registered files
	Status(StatusArgs),
	/// Decrypt and encrypt again for the current admins
	Reencrypt(ReencryptArgs),
	/// Prepare a scratch repository for integration tests
	#[command(hide = true)]
	TestingInit,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			vcs: args.vcs.clone(),
			crypto: args.crypto.clone(),
			debug: args.debug,
			config_dir: args.config_dir.clone(),
			team: args.team.clone(),
			editor: args.editor.clone(),
			umask: args.umask,
			commit_mode: args.commit_mode.clone(),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			config_file: args.config_file.clone(),
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("blackbox={}", logging.level.as_str())));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let args = Args::parse();
	let config = load_config_with_cli(CliOverrides::from(&args))
		.context("failed to load configuration")?;
	init_tracing(&config.logging);
	debug!(command = ?args.command, "starting blackbox");

	let ctx = commands::Context::new(&config)?;
	match args.command {
		Command::Decrypt(a) => commands::crypt::run_decrypt(a, &ctx).await,
		Command::Encrypt(a) => commands::crypt::run_encrypt(a, &ctx).await,
		Command::Edit(a) => commands::view::run_edit(a, &ctx).await,
		Command::Cat(a) => commands::view::run_cat(a, &ctx).await,
		Command::Diff(a) => commands::view::run_diff(a, &ctx).await,
		Command::Init(a) => commands::setup::run_init(a, &ctx).await,
		Command::Admin { command } => commands::admin::run(command, &ctx).await,
		Command::File { command } => commands::file::run(command, &ctx).await,
		Command::Info(a) => commands::setup::run_info(a, &ctx).await,
		Command::Shred(a) => commands::crypt::run_shred(a, &ctx).await,
		Command::Status(a) => commands::status::run(a, &ctx).await,
		Command::Reencrypt(a) => commands::crypt::run_reencrypt(a, &ctx).await,
		Command::TestingInit => commands::setup::run_testing_init(&ctx).await,
	}
}
