//! Console logging with task-summary collection.
//!
//! The pipeline reports through the [`Log`] trait so tests can capture output
//! without touching stdout. The production [`Logger`] prints to the console
//! and mirrors every message as a [`tracing`] event, which lands in whatever
//! subscriber [`init_subscriber`] installed (filtered by `RUST_LOG`).

use std::sync::Mutex;

/// Outcome of one pipeline step, for summary reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Step ran and made its changes.
    Ok,
    /// Step had nothing to do (advisory skip).
    Skipped,
    /// Step raised the fatal error that ended the run.
    Failed,
}

/// One recorded step result.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Step name as shown in the summary.
    pub name: String,
    /// How the step ended.
    pub status: TaskStatus,
    /// Optional detail shown in parentheses after the name.
    pub message: Option<String>,
}

/// Logging interface injected into the pipeline.
pub trait Log: Send + Sync {
    /// Announce a major phase of the run.
    fn stage(&self, msg: &str);
    /// Informational progress message.
    fn info(&self, msg: &str);
    /// Advisory condition: logged, never changes the exit outcome.
    fn warn(&self, msg: &str);
    /// Fatal condition being surfaced to the user.
    fn error(&self, msg: &str);
    /// Verbose detail, hidden unless verbose output is enabled.
    fn debug(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
    /// Print the summary of all recorded steps.
    fn print_summary(&self);
}

/// Console [`Log`] implementation.
pub struct Logger {
    verbose: bool,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl Logger {
    /// Create a logger. `verbose` enables debug output on the terminal.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn tasks_lock(&self) -> std::sync::MutexGuard<'_, Vec<TaskEntry>> {
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[allow(clippy::print_stdout, clippy::print_stderr)]
impl Log for Logger {
    fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        tracing::info!(target: "bvdb", "{msg}");
    }

    fn info(&self, msg: &str) {
        println!("  {msg}");
        tracing::info!(target: "bvdb", "{msg}");
    }

    fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        tracing::warn!(target: "bvdb", "{msg}");
    }

    fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        tracing::error!(target: "bvdb", "{msg}");
    }

    fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        tracing::debug!(target: "bvdb", "{msg}");
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks_lock().push(TaskEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }

    fn print_summary(&self) {
        let tasks = self.tasks_lock();
        if tasks.is_empty() {
            return;
        }

        println!();
        println!("\x1b[1;34m==>\x1b[0m \x1b[1mSummary\x1b[0m");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for task in tasks.iter() {
            let (icon, color) = match task.status {
                TaskStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                TaskStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                TaskStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = match &task.message {
                Some(msg) => format!(" ({msg})"),
                None => String::new(),
            };
            println!("  {color}{icon} {}{suffix}\x1b[0m", task.name);
        }

        println!();
        let total = ok + skipped + failed;
        println!(
            "  {total} steps: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        );
    }
}

/// Install the global tracing subscriber.
///
/// Output goes to stderr and is filtered by `RUST_LOG`; with no `RUST_LOG`
/// set, only warnings and errors from the tracing side are shown (the console
/// logger is the primary user-facing channel).
pub fn init_subscriber() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
