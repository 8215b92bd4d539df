//! The provisioning pipeline: fetch, extract, patch, copy, configure, clean.
//!
//! Steps run strictly in order; the first fatal error unwinds the run. The
//! scratch workspace is a [`Drop`] guard, so its removal happens on the
//! success path, the failure path, and even a panic — cleanup is never a
//! call site someone can forget.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::archive;
use crate::config::ProvisionConfig;
use crate::envfile;
use crate::error::{ProvisionError, Result};
use crate::fetch::RemoteFetcher;
use crate::fsops;
use crate::logging::{Log, TaskStatus};
use crate::prompt::AnswerProvider;

/// Scratch directory name under the project root.
pub const SCRATCH_DIR: &str = ".bvdb";
/// File name of the downloaded archive inside the scratch directory.
const ARCHIVE_NAME: &str = "setup.tar.gz";
/// Extraction directory name inside the scratch directory.
const EXTRACT_DIR: &str = "setup";
/// Nested directory preferred as the bundle root when present.
const BUNDLE_SUBDIR: &str = "setup";
/// Config file patched inside the bundle, relative to the bundle root.
const CONFIG_FILE: &str = "config/config.php";
/// Pattern for the web-dir assignment in the bundled PHP config.
const WEB_DIR_PATTERN: &str = r"^\$web_dir\s*=";
/// Replacement line for the web-dir assignment.
const WEB_DIR_LINE: &str = "$web_dir    = $root_dir . '/public';";
/// Default env file path relative to the project root.
const DEFAULT_ENV: &str = ".env";
/// Legacy residual artifacts swept from the project root at run end.
const LEGACY_ARTIFACTS: [&str; 2] = [".security", ".env.bak"];

/// Pipeline-owned temporary directory, deleted when dropped.
///
/// Everything the run downloads or unpacks lives under this directory, so a
/// single recursive sweep removes all of it. The drop sweep also clears the
/// legacy artifacts older provisioning runs used to leave behind. Sweep
/// failures are advisory: they are warned about and swallowed.
pub struct ScratchWorkspace {
    root: PathBuf,
    project_root: PathBuf,
    log: Arc<dyn Log>,
}

impl ScratchWorkspace {
    /// Create `<project_root>/.bvdb/`.
    ///
    /// # Errors
    ///
    /// Fatal if the directory cannot be created.
    pub fn create(project_root: &Path, log: Arc<dyn Log>) -> Result<Self> {
        let root = project_root.join(SCRATCH_DIR);
        std::fs::create_dir_all(&root)
            .map_err(|e| ProvisionError::io("creating directory", &root, e))?;
        Ok(Self {
            root,
            project_root: project_root.to_path_buf(),
            log,
        })
    }

    /// The scratch directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if let Err(e) = fsops::remove_recursive(&self.root) {
            self.log.warn(&format!(
                "could not remove scratch directory {}: {e}",
                self.root.display()
            ));
        }
        for artifact in LEGACY_ARTIFACTS {
            let path = self.project_root.join(artifact);
            if let Err(e) = fsops::remove_recursive(&path) {
                self.log
                    .warn(&format!("could not remove {}: {e}", path.display()));
            }
        }
        self.log.record_task("clean up scratch", TaskStatus::Ok, None);
    }
}

/// One provisioning run over a project directory.
pub struct Pipeline {
    config: ProvisionConfig,
    project_root: PathBuf,
    fetcher: Arc<dyn RemoteFetcher>,
    answers: Arc<dyn AnswerProvider>,
    log: Arc<dyn Log>,
}

impl Pipeline {
    /// Wire up a pipeline with its injected capabilities.
    #[must_use]
    pub fn new(
        config: ProvisionConfig,
        project_root: PathBuf,
        fetcher: Arc<dyn RemoteFetcher>,
        answers: Arc<dyn AnswerProvider>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            config,
            project_root,
            fetcher,
            answers,
            log,
        }
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error after the scratch workspace has been
    /// swept; advisory conditions are logged and never surface here.
    pub fn run(&self) -> Result<()> {
        // Must fail before any network or scratch I/O happens.
        self.config.validate()?;

        self.log
            .stage(&format!("Provisioning {}", self.project_root.display()));
        let scratch = ScratchWorkspace::create(&self.project_root, Arc::clone(&self.log))?;
        self.run_steps(scratch.root())
        // `scratch` drops here, on both the Ok and Err edges.
    }

    fn run_steps(&self, scratch: &Path) -> Result<()> {
        let archive_path = self.checked("fetch archive", self.fetch_archive(scratch))?;
        let extract_dir =
            self.checked("extract archive", self.extract_bundle(&archive_path, scratch))?;
        let bundle_root = self.locate_bundle_root(&extract_dir);
        self.checked("patch web config", self.patch_config(&bundle_root))?;
        self.checked("copy mapped files", self.copy_mapped(&bundle_root))?;
        self.checked("configure env", self.configure_env())?;
        Ok(())
    }

    /// Record a failed step before propagating its error.
    fn checked<T>(&self, name: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.log.error(&format!("{name}: {e}"));
            self.log
                .record_task(name, TaskStatus::Failed, Some(&e.to_string()));
        }
        result
    }

    fn fetch_archive(&self, scratch: &Path) -> Result<PathBuf> {
        self.log
            .info(&format!("fetching {}", self.config.setup_url));
        let bytes = self.fetcher.fetch(&self.config.setup_url)?;
        let archive_path = scratch.join(ARCHIVE_NAME);
        std::fs::write(&archive_path, &bytes)
            .map_err(|e| ProvisionError::io("writing", &archive_path, e))?;
        self.log.record_task(
            "fetch archive",
            TaskStatus::Ok,
            Some(&format!("{} bytes", bytes.len())),
        );
        Ok(archive_path)
    }

    fn extract_bundle(&self, archive_path: &Path, scratch: &Path) -> Result<PathBuf> {
        let extract_dir = scratch.join(EXTRACT_DIR);
        // The intermediate tar lands inside the scratch directory, so the
        // workspace sweep covers it.
        let tar_path = archive::extract(archive_path, &extract_dir)?;
        self.log
            .debug(&format!("decompressed to {}", tar_path.display()));
        self.log.record_task("extract archive", TaskStatus::Ok, None);
        Ok(extract_dir)
    }

    /// Prefer a nested `setup/` directory as the bundle root; fall back to
    /// the extraction directory itself. Archive layouts vary by version.
    fn locate_bundle_root(&self, extract_dir: &Path) -> PathBuf {
        let nested = extract_dir.join(BUNDLE_SUBDIR);
        let root = if nested.is_dir() {
            nested
        } else {
            extract_dir.to_path_buf()
        };
        self.log.debug(&format!("bundle root: {}", root.display()));
        root
    }

    fn patch_config(&self, bundle_root: &Path) -> Result<()> {
        let target = bundle_root.join(CONFIG_FILE);
        if !target.is_file() {
            self.log.warn(&format!(
                "no {CONFIG_FILE} in bundle; skipping config patch"
            ));
            self.log.record_task(
                "patch web config",
                TaskStatus::Skipped,
                Some("file not in bundle"),
            );
            return Ok(());
        }

        let pattern = Regex::new(WEB_DIR_PATTERN)
            .map_err(|e| ProvisionError::Config(format!("bad web-dir pattern: {e}")))?;
        match crate::patch::replace_assignment(&target, &pattern, WEB_DIR_LINE)? {
            crate::patch::PatchOutcome::Replaced => {
                self.log.record_task("patch web config", TaskStatus::Ok, None);
            }
            _ => {
                self.log.warn(&format!(
                    "web-dir assignment not found in {}; nothing to do",
                    target.display()
                ));
                self.log.record_task(
                    "patch web config",
                    TaskStatus::Skipped,
                    Some("pattern not found"),
                );
            }
        }
        Ok(())
    }

    fn copy_mapped(&self, bundle_root: &Path) -> Result<()> {
        if self.config.setup_map.is_empty() {
            self.log
                .record_task("copy mapped files", TaskStatus::Skipped, Some("empty map"));
            return Ok(());
        }

        let mut copied = 0usize;
        let mut skipped = 0usize;
        for (source, dest) in self.config.setup_map.iter() {
            let from = bundle_root.join(source);
            if !from.exists() {
                self.log
                    .warn(&format!("bundle has no '{source}'; skipping"));
                skipped += 1;
                continue;
            }
            let to = self.project_root.join(dest);
            self.log.debug(&format!("copying {source} -> {dest}"));
            fsops::copy_recursive(&from, &to)?;
            copied += 1;
        }

        let status = if copied == 0 {
            TaskStatus::Skipped
        } else {
            TaskStatus::Ok
        };
        self.log.record_task(
            "copy mapped files",
            status,
            Some(&format!("{copied} copied, {skipped} skipped")),
        );
        Ok(())
    }

    fn configure_env(&self) -> Result<()> {
        let env_rel = self.config.setup_map.get(DEFAULT_ENV).unwrap_or(DEFAULT_ENV);
        let env_path = self.project_root.join(env_rel);
        let configured = envfile::configure(
            &env_path,
            &self.config,
            self.fetcher.as_ref(),
            self.answers.as_ref(),
            self.log.as_ref(),
        )?;
        if configured {
            self.log.record_task("configure env", TaskStatus::Ok, None);
        } else {
            self.log
                .record_task("configure env", TaskStatus::Skipped, Some("no env file"));
        }
        Ok(())
    }
}
