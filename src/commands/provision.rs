use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ProvisionOpts};
use crate::config::ProvisionConfig;
use crate::fetch::HttpFetcher;
use crate::logging::{Log, Logger};
use crate::pipeline::Pipeline;
use crate::prompt::{AnswerProvider, DefaultAnswers, StdinAnswers};

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if the project root or config cannot be resolved, or if
/// the pipeline raises a fatal error.
pub fn run(global: &GlobalOpts, opts: &ProvisionOpts, log: Arc<Logger>) -> Result<()> {
    let root = super::resolve_root(global)?;

    let version = option_env!("BVDB_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("bvdb {version}"));

    log.stage("Loading configuration");
    let config_path = root.join(&opts.config);
    let config = ProvisionConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    log.debug(&format!("{} setup_map entries", config.setup_map.len()));

    let answers: Arc<dyn AnswerProvider> = if opts.defaults {
        Arc::new(DefaultAnswers::new())
    } else {
        Arc::new(StdinAnswers::new())
    };

    let pipeline = Pipeline::new(
        config,
        root.clone(),
        Arc::new(HttpFetcher::new()),
        answers,
        Arc::clone(&log) as Arc<dyn Log>,
    );
    let outcome = pipeline.run();

    log.print_summary();

    outcome.with_context(|| format!("provisioning {}", root.display()))?;
    log.info("provisioning complete");
    Ok(())
}
