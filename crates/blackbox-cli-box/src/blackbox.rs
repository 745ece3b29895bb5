// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use blackbox_cli_commit::FlushSummary;
use blackbox_cli_config::BlackboxConfig;
use blackbox_common_backend::{
	discover_vcs, BackendError, BackendOptions, Crypter, CrypterCatalog, Vcs, VcsCatalog,
};
use blackbox_common_registry::{contains_sorted, SortedFile, ADMINS_FILE, FILES_FILE};
use tracing::{debug, info};

use crate::configdir::{existing_config_dir, find_config_dir, generate_config_dir};
use crate::error::{BoxError, Result};
use crate::names::repo_relative;
use crate::prompt::{Prompter, StdinPrompter};
use crate::shred::Shredder;

/// Everything a [`Blackbox`] needs besides the backends themselves.
#[derive(Debug, Clone)]
pub struct BoxSettings {
	/// Repository backend by name; discovered when unset.
	pub vcs: Option<String>,
	pub crypto: String,
	pub backend: BackendOptions,
	/// Explicit config dir, relative to the working directory.
	pub config_dir: Option<PathBuf>,
	pub repo_base_dir: Option<PathBuf>,
	pub team: Option<String>,
	/// Umask applied while writing plaintext.
	pub umask: u32,
	pub group_read: bool,
	pub editor: String,
}

impl BoxSettings {
	pub fn from_config(config: &BlackboxConfig) -> Self {
		Self {
			vcs: config.backends.vcs.clone(),
			crypto: config.backends.crypto.clone(),
			backend: BackendOptions {
				debug: config.backends.debug,
				commit_mode: config.commit.mode,
			},
			config_dir: config.repo.config_dir.clone(),
			repo_base_dir: config.repo.repo_base_dir.clone(),
			team: config.repo.team.clone(),
			umask: config.decrypt.umask,
			group_read: config.decrypt.group_read,
			editor: config.editor.command.clone(),
		}
	}
}

impl Default for BoxSettings {
	fn default() -> Self {
		let defaults = blackbox_cli_config::runtime::DecryptConfig::default();
		Self {
			vcs: None,
			crypto: blackbox_cli_config::runtime::DEFAULT_CRYPTO.to_string(),
			backend: BackendOptions::default(),
			config_dir: None,
			repo_base_dir: None,
			team: None,
			umask: defaults.umask,
			group_read: defaults.group_read,
			editor: blackbox_cli_config::runtime::DEFAULT_EDITOR.to_string(),
		}
	}
}

/// A repository with its registries and the backends that act on it.
///
/// The registries are read at most once and cached; verbs that change them
/// update the cache together with the file.
pub struct Blackbox {
	pub(crate) repo_root: PathBuf,
	pub(crate) config_dir: PathBuf,
	pub(crate) settings: BoxSettings,
	pub(crate) vcs: Box<dyn Vcs>,
	pub(crate) crypter: Box<dyn Crypter>,
	pub(crate) prompter: Box<dyn Prompter>,
	shredder: Option<Shredder>,
	admins: Option<Vec<String>>,
	files: Option<Vec<String>>,
}

impl Blackbox {
	pub fn new(
		repo_root: impl Into<PathBuf>,
		config_dir: impl Into<PathBuf>,
		vcs: Box<dyn Vcs>,
		crypter: Box<dyn Crypter>,
		settings: BoxSettings,
	) -> Self {
		Self {
			repo_root: repo_root.into(),
			config_dir: config_dir.into(),
			settings,
			vcs,
			crypter,
			prompter: Box::new(StdinPrompter),
			shredder: None,
			admins: None,
			files: None,
		}
	}

	pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
		self.prompter = Box::new(prompter);
		self
	}

	pub fn with_shredder(mut self, shredder: Shredder) -> Self {
		self.shredder = Some(shredder);
		self
	}

	/// Opens the initialized repository containing `cwd`.
	pub async fn open(
		cwd: &Path,
		settings: BoxSettings,
		vcs_catalog: &VcsCatalog,
		crypter_catalog: &CrypterCatalog,
	) -> Result<Self> {
		let cwd = canonical(cwd)?;
		let crypter = crypter_catalog.resolve(&settings.crypto, &settings.backend)?;

		let (repo_root, config_dir, vcs) = match settings.config_dir {
			Some(ref configured) => {
				let config_dir = existing_config_dir(&cwd, configured)?;
				let (vcs, found) = select_vcs(vcs_catalog, &settings, &cwd).await?;
				let root = match settings.repo_base_dir {
					Some(ref base) => cwd.join(base),
					None => found.unwrap_or_else(|| cwd.clone()),
				};
				(root, config_dir, vcs)
			}
			None => {
				let located = find_config_dir(&cwd, settings.team.as_deref())?;
				let root = match settings.repo_base_dir {
					Some(ref base) => cwd.join(base),
					None => located.repo_root,
				};
				let (vcs, _) = select_vcs(vcs_catalog, &settings, &root).await?;
				(root, located.config_dir, vcs)
			}
		};

		info!(
			repo_root = %repo_root.display(),
			config_dir = %config_dir.display(),
			vcs = vcs.name(),
			crypto = crypter.name(),
			"opened blackbox"
		);
		Ok(Self::new(repo_root, config_dir, vcs, crypter, settings))
	}

	/// Prepares a repository that has no config dir yet.
	///
	/// The repository root is the one the repository backend reports for
	/// `cwd`, or `cwd` itself.
	pub async fn uninitialized(
		cwd: &Path,
		settings: BoxSettings,
		vcs_catalog: &VcsCatalog,
		crypter_catalog: &CrypterCatalog,
	) -> Result<Self> {
		let cwd = canonical(cwd)?;
		let crypter = crypter_catalog.resolve(&settings.crypto, &settings.backend)?;
		let (vcs, found) = select_vcs(vcs_catalog, &settings, &cwd).await?;
		let repo_root = match settings.repo_base_dir {
			Some(ref base) => cwd.join(base),
			None => found.unwrap_or_else(|| cwd.clone()),
		};
		let config_dir = generate_config_dir(
			&repo_root,
			settings.config_dir.as_deref(),
			settings.team.as_deref(),
		);
		debug!(
			repo_root = %repo_root.display(),
			config_dir = %config_dir.display(),
			vcs = vcs.name(),
			"prepared uninitialized blackbox"
		);
		Ok(Self::new(repo_root, config_dir, vcs, crypter, settings))
	}

	pub fn repo_root(&self) -> &Path {
		&self.repo_root
	}

	pub fn config_dir(&self) -> &Path {
		&self.config_dir
	}

	pub fn settings(&self) -> &BoxSettings {
		&self.settings
	}

	pub fn vcs(&self) -> &dyn Vcs {
		self.vcs.as_ref()
	}

	pub fn crypter(&self) -> &dyn Crypter {
		self.crypter.as_ref()
	}

	/// True when the config dir lies outside the repository, where its
	/// changes cannot be committed with the rest.
	pub fn is_config_read_only(&self) -> bool {
		!self.config_dir.starts_with(&self.repo_root)
	}

	pub(crate) fn require_writable(&self) -> Result<()> {
		if self.is_config_read_only() {
			return Err(BoxError::ConfigReadOnly);
		}
		Ok(())
	}

	pub fn admins_path(&self) -> PathBuf {
		self.config_dir.join(ADMINS_FILE)
	}

	pub fn files_path(&self) -> PathBuf {
		self.config_dir.join(FILES_FILE)
	}

	/// Name of a config dir file as the repository backend sees it.
	pub(crate) fn config_rel(&self, file: &str) -> String {
		let path = self.config_dir.join(file);
		match path.strip_prefix(&self.repo_root) {
			Ok(rel) => rel.to_string_lossy().into_owned(),
			Err(_) => path.to_string_lossy().into_owned(),
		}
	}

	/// Absolute path of a registered name.
	pub(crate) fn plain_path(&self, name: &str) -> PathBuf {
		self.repo_root.join(name)
	}

	/// Maps names typed relative to `cwd` onto repository-relative names.
	pub fn relative_names<S: AsRef<str>>(&self, cwd: &Path, names: &[S]) -> Result<Vec<String>> {
		let cwd = canonical(cwd)?;
		names
			.iter()
			.map(|n| repo_relative(&self.repo_root, &cwd, n.as_ref()))
			.collect()
	}

	pub(crate) fn admins(&mut self) -> Result<Vec<String>> {
		let list = match self.admins.take() {
			Some(list) => list,
			None => SortedFile::new(self.admins_path()).load()?,
		};
		Ok(self.admins.insert(list).clone())
	}

	pub(crate) fn files(&mut self) -> Result<Vec<String>> {
		let list = match self.files.take() {
			Some(list) => list,
			None => SortedFile::new(self.files_path()).load()?,
		};
		Ok(self.files.insert(list).clone())
	}

	pub(crate) fn set_admins(&mut self, admins: Vec<String>) {
		self.admins = Some(admins);
	}

	pub(crate) fn set_files(&mut self, files: Vec<String>) {
		self.files = Some(files);
	}

	/// Admins, failing when there are none to encrypt for.
	pub(crate) fn recipients(&mut self) -> Result<Vec<String>> {
		let admins = self.admins()?;
		if admins.is_empty() {
			return Err(BoxError::NoAdmins);
		}
		Ok(admins)
	}

	/// `names`, or every registered file when `names` is empty.
	pub(crate) fn names_or_all(&mut self, names: &[String]) -> Result<(Vec<String>, Vec<String>)> {
		let files = self.files()?;
		let selected = if names.is_empty() {
			files.clone()
		} else {
			names.to_vec()
		};
		Ok((selected, files))
	}

	pub(crate) fn is_registered(files: &[String], name: &str) -> bool {
		contains_sorted(files, name)
	}

	pub(crate) async fn shredder(&mut self) -> Shredder {
		if let Some(ref shredder) = self.shredder {
			return shredder.clone();
		}
		let shredder = Shredder::probe().await;
		self.shredder = Some(shredder.clone());
		shredder
	}

	/// Carries out every commit the verbs queued.
	pub async fn flush_commits(&mut self) -> Result<FlushSummary> {
		Ok(self.vcs.flush_commits().await?)
	}
}

fn canonical(path: &Path) -> Result<PathBuf> {
	std::fs::canonicalize(path).map_err(|e| BoxError::io(path, e))
}

async fn select_vcs(
	catalog: &VcsCatalog,
	settings: &BoxSettings,
	dir: &Path,
) -> Result<(Box<dyn Vcs>, Option<PathBuf>)> {
	if let Some(ref name) = settings.vcs {
		let vcs = catalog.resolve(name, &settings.backend)?;
		let root = vcs.discover(dir).await;
		return Ok((vcs, root));
	}
	match discover_vcs(catalog, dir, &settings.backend).await {
		Some((vcs, root)) => Ok((vcs, Some(root))),
		None => Err(BoxError::Backend(BackendError::Unresolved {
			kind: "vcs",
			name: "(auto-detect)".to_string(),
			available: catalog.names().iter().map(|n| n.to_string()).collect(),
		})),
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;
	use blackbox_common_backend::mock::{MockCrypter, MockVcs};
	use tempfile::TempDir;

	use crate::prompt::ScriptedPrompter;

	/// A temp repository with an initialized config dir and mock backends.
	pub struct Fixture {
		pub temp: TempDir,
		pub crypter: MockCrypter,
		pub vcs: MockVcs,
		pub prompter: ScriptedPrompter,
	}

	impl Fixture {
		pub fn new(admins: &[&str], files: &[&str]) -> Self {
			let temp = TempDir::new().unwrap();
			let config = temp.path().join(".blackbox");
			std::fs::create_dir(&config).unwrap();
			let admins_file = SortedFile::new(config.join(ADMINS_FILE));
			let files_file = SortedFile::new(config.join(FILES_FILE));
			std::fs::write(admins_file.path(), "").unwrap();
			std::fs::write(files_file.path(), "").unwrap();
			if !admins.is_empty() {
				admins_file.append(admins).unwrap();
			}
			if !files.is_empty() {
				files_file.append(files).unwrap();
			}
			Self {
				temp,
				crypter: MockCrypter::new(),
				vcs: MockVcs::new(),
				prompter: ScriptedPrompter::new([]),
			}
		}

		pub fn root(&self) -> &Path {
			self.temp.path()
		}

		pub fn write(&self, name: &str, content: &str) {
			let path = self.root().join(name);
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent).unwrap();
			}
			std::fs::write(path, content).unwrap();
		}

		pub fn read(&self, name: &str) -> String {
			std::fs::read_to_string(self.root().join(name)).unwrap()
		}

		pub fn exists(&self, name: &str) -> bool {
			self.root().join(name).exists()
		}

		pub fn blackbox(&self) -> Blackbox {
			Blackbox::new(
				self.root(),
				self.root().join(".blackbox"),
				Box::new(self.vcs.clone()),
				Box::new(self.crypter.clone()),
				BoxSettings::default(),
			)
			.with_prompter(self.prompter.clone())
			.with_shredder(Shredder::unlink_only())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::testing::Fixture;
	use super::*;
	use blackbox_common_backend::mock::{MockCrypter, MockVcs};
	use blackbox_common_backend::BackendOptions;

	fn mock_vcs(_: &BackendOptions) -> Box<dyn Vcs> {
		Box::new(MockVcs::new())
	}

	fn mock_crypter(_: &BackendOptions) -> Box<dyn Crypter> {
		Box::new(MockCrypter::new())
	}

	fn catalogs() -> (VcsCatalog, CrypterCatalog) {
		let mut vcs = VcsCatalog::new("vcs");
		vcs.register("MOCK", 10, mock_vcs);
		let mut crypters = CrypterCatalog::new("crypto");
		crypters.register("GnuPG", 100, mock_crypter);
		(vcs, crypters)
	}

	/// Test: opening from a subdirectory finds the config dir above it and
	/// uses that directory as the repository root.
	///
	/// Why this test is important: All registered names are relative to that
	/// root; getting it wrong makes every file look unregistered.
	#[tokio::test]
	async fn test_open_from_subdirectory() {
		let fx = Fixture::new(&["alice@example.com"], &[]);
		let sub = fx.root().join("deep/sub");
		std::fs::create_dir_all(&sub).unwrap();
		let (vcs, crypters) = catalogs();

		let bx = Blackbox::open(&sub, BoxSettings::default(), &vcs, &crypters)
			.await
			.unwrap();
		let root = std::fs::canonicalize(fx.root()).unwrap();
		assert_eq!(bx.repo_root(), root);
		assert_eq!(bx.config_dir(), root.join(".blackbox"));
		assert!(!bx.is_config_read_only());
		assert_eq!(bx.config_rel(FILES_FILE), ".blackbox/blackbox-files.txt");
	}

	#[tokio::test]
	async fn test_open_unknown_crypto_fails() {
		let fx = Fixture::new(&[], &[]);
		let (vcs, crypters) = catalogs();
		let settings = BoxSettings {
			crypto: "rot13".into(),
			..Default::default()
		};
		let err = Blackbox::open(fx.root(), settings, &vcs, &crypters)
			.await
			.err()
			.unwrap();
		assert!(matches!(err, BoxError::Backend(BackendError::Unresolved { .. })));
	}

	#[tokio::test]
	async fn test_open_without_config_dir_fails() {
		let temp = tempfile::TempDir::new().unwrap();
		let (vcs, crypters) = catalogs();
		let settings = BoxSettings {
			team: Some("blackbox-test-unlikely-team".into()),
			..Default::default()
		};
		// Only meaningful when no ancestor of the temp dir has a config dir.
		if let Err(err) = Blackbox::open(temp.path(), settings, &vcs, &crypters).await {
			assert!(matches!(err, BoxError::ConfigDirNotFound { .. }));
		}
	}

	#[tokio::test]
	async fn test_explicit_config_dir_outside_repo_is_read_only() {
		let fx = Fixture::new(&[], &[]);
		let elsewhere = tempfile::TempDir::new().unwrap();
		let (vcs, crypters) = catalogs();
		let settings = BoxSettings {
			config_dir: Some(elsewhere.path().to_path_buf()),
			..Default::default()
		};
		let bx = Blackbox::open(fx.root(), settings, &vcs, &crypters)
			.await
			.unwrap();
		assert!(bx.is_config_read_only());
		assert!(matches!(bx.require_writable(), Err(BoxError::ConfigReadOnly)));
	}

	#[tokio::test]
	async fn test_uninitialized_uses_team_dir() {
		let temp = tempfile::TempDir::new().unwrap();
		let (vcs, crypters) = catalogs();
		let settings = BoxSettings {
			team: Some("ops".into()),
			..Default::default()
		};
		let bx = Blackbox::uninitialized(temp.path(), settings, &vcs, &crypters)
			.await
			.unwrap();
		let root = std::fs::canonicalize(temp.path()).unwrap();
		assert_eq!(bx.config_dir(), root.join(".blackbox-ops"));
	}

	#[test]
	fn test_registries_are_cached() {
		let fx = Fixture::new(&["alice@example.com"], &["a.txt"]);
		let mut bx = fx.blackbox();
		assert_eq!(bx.files().unwrap(), vec!["a.txt"]);

		std::fs::write(bx.files_path(), "b.txt\n").unwrap();
		assert_eq!(bx.files().unwrap(), vec!["a.txt"]);
	}

	#[test]
	fn test_recipients_require_admins() {
		let fx = Fixture::new(&[], &[]);
		let mut bx = fx.blackbox();
		assert!(matches!(bx.recipients(), Err(BoxError::NoAdmins)));
	}

	#[test]
	fn test_relative_names() {
		let fx = Fixture::new(&[], &[]);
		let root = std::fs::canonicalize(fx.root()).unwrap();
		let bx = Blackbox::new(
			&root,
			root.join(".blackbox"),
			Box::new(MockVcs::new()),
			Box::new(MockCrypter::new()),
			BoxSettings::default(),
		);
		std::fs::create_dir(root.join("sub")).unwrap();
		assert_eq!(
			bx.relative_names(&root.join("sub"), &["x.txt", "../y.txt"]).unwrap(),
			vec!["sub/x.txt", "y.txt"]
		);
	}
}
