// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project fixture, an in-memory
// fetcher, and a capturing logger so each integration test can drive the
// full pipeline without touching the network or stdout.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bvdb::error::{ProvisionError, Result};
use bvdb::fetch::RemoteFetcher;
use bvdb::logging::{Log, TaskEntry, TaskStatus};
use bvdb::prompt::AnswerProvider;

/// Build a gzip-compressed tar archive from `(path, contents)` entries.
pub fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *contents)
            .expect("append archive entry");
    }
    let tar_bytes = builder.into_inner().expect("finish tar");
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar_bytes).expect("gzip tar");
    encoder.finish().expect("finish gzip")
}

/// In-memory fetcher mapping URLs to canned bodies. Unknown URLs produce a
/// fetch error, which is how tests simulate a transport failure.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }
}

impl RemoteFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(ProvisionError::Config("missing URL".to_string()));
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| ProvisionError::Fetch {
                url: url.to_string(),
                source: "no canned response".into(),
            })
    }
}

/// Capturing [`Log`] implementation for assertions on messages and tasks.
#[derive(Debug, Default)]
pub struct CapturedLog {
    pub messages: Mutex<Vec<(String, String)>>,
    pub tasks: Mutex<Vec<TaskEntry>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages recorded at the given level.
    pub fn at_level(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .expect("captured log poisoned")
            .iter()
            .filter(|(l, _)| l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// The recorded status of a named task, if any.
    pub fn task_status(&self, name: &str) -> Option<TaskStatus> {
        self.tasks
            .lock()
            .expect("captured log poisoned")
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.status)
    }

    fn push(&self, level: &str, msg: &str) {
        self.messages
            .lock()
            .expect("captured log poisoned")
            .push((level.to_string(), msg.to_string()));
    }
}

impl Log for CapturedLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks
            .lock()
            .expect("captured log poisoned")
            .push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }

    fn print_summary(&self) {}
}

/// Provider with fixed answers keyed by a substring of the prompt text;
/// unmatched prompts fall back to the default.
#[derive(Debug, Default)]
pub struct FixedAnswers {
    answers: HashMap<String, String>,
}

impl FixedAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_answer(mut self, prompt_contains: &str, answer: &str) -> Self {
        self.answers
            .insert(prompt_contains.to_string(), answer.to_string());
        self
    }
}

impl AnswerProvider for FixedAnswers {
    fn ask(&self, prompt: &str, default: &str) -> String {
        self.answers
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map_or_else(|| default.to_string(), |(_, answer)| answer.clone())
    }
}

/// An isolated project directory backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct ProjectFixture {
    pub root: tempfile::TempDir,
}

impl ProjectFixture {
    /// Create an empty project directory.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file under the project root, creating parent directories.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write project file");
        path
    }

    /// Read a file under the project root as UTF-8 text.
    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.path().join(relative)).expect("read project file")
    }

    /// Whether a path exists under the project root.
    pub fn exists(&self, relative: &str) -> bool {
        self.root.path().join(relative).exists()
    }
}
