#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the full provisioning pipeline.
//!
//! Each test drives [`bvdb::pipeline::Pipeline`] end to end against a real
//! temporary project directory, with the network and the terminal replaced
//! by in-memory fakes.

mod common;

use std::sync::Arc;

use bvdb::config::{ProvisionConfig, SetupMap};
use bvdb::error::ProvisionError;
use bvdb::logging::TaskStatus;
use bvdb::pipeline::{Pipeline, SCRATCH_DIR};
use bvdb::prompt::DefaultAnswers;

use common::{build_archive, CapturedLog, FakeFetcher, FixedAnswers, ProjectFixture};

const SETUP_URL: &str = "https://example.com/setup.tar.gz";
const SALTS_URL: &str = "https://example.com/salts";

const CONFIG_PHP: &str = "<?php\n$root_dir = dirname(__DIR__);\n$web_dir = $root_dir . '/web';\n";
const ENV_TEMPLATE: &str = "DB_NAME=replaceme\n# WPSALTS\n# WPLICENSES\n";
const SALTS_BODY: &str = "define('AUTH_KEY', 'abc');\ndefine('AUTH_SALT', 'def');\n";

fn standard_archive() -> Vec<u8> {
    build_archive(&[
        ("setup/config/config.php", CONFIG_PHP.as_bytes()),
        ("setup/web/index.php", b"<?php // front controller\n"),
        ("setup/web/app/plugins/.gitkeep", b""),
        ("setup/.env", ENV_TEMPLATE.as_bytes()),
    ])
}

fn standard_config() -> ProvisionConfig {
    ProvisionConfig {
        setup_url: SETUP_URL.to_string(),
        salts_url: SALTS_URL.to_string(),
        licenses_url: String::new(),
        setup_map: SetupMap::from_pairs(vec![
            ("config".to_string(), "config".to_string()),
            ("web".to_string(), "public".to_string()),
            (".env".to_string(), ".env".to_string()),
        ]),
    }
}

fn run_pipeline(
    config: ProvisionConfig,
    fixture: &ProjectFixture,
    fetcher: FakeFetcher,
    log: &Arc<CapturedLog>,
) -> Result<(), ProvisionError> {
    Pipeline::new(
        config,
        fixture.root_path().to_path_buf(),
        Arc::new(fetcher),
        Arc::new(DefaultAnswers::new()),
        Arc::clone(log) as Arc<dyn bvdb::logging::Log>,
    )
    .run()
}

#[test]
fn full_run_provisions_the_project_tree() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new()
        .with_body(SETUP_URL, &standard_archive())
        .with_body(SALTS_URL, SALTS_BODY.as_bytes());
    let log = Arc::new(CapturedLog::new());

    run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap();

    // Mapped files arrive with their contents intact.
    assert_eq!(
        fixture.read_file("public/index.php"),
        "<?php // front controller\n"
    );
    assert!(fixture.exists("public/app/plugins/.gitkeep"));

    // The bundled config is patched before it is copied out.
    let config_php = fixture.read_file("config/config.php");
    assert!(
        config_php.contains("$web_dir    = $root_dir . '/public';"),
        "web_dir assignment must point at /public, got:\n{config_php}"
    );
    assert!(!config_php.contains("'/web'"));

    // The env file is seeded: salts block replaces its marker verbatim and
    // every key is present exactly once.
    let env = fixture.read_file(".env");
    assert!(env.contains(SALTS_BODY.trim_end()));
    assert!(!env.contains("WPSALTS"));
    assert!(env.contains("# WPLICENSES\n"), "unconfigured marker survives");
    assert_eq!(env.matches("DB_NAME=").count(), 1);
    assert!(env.contains("DB_NAME=wordpress\n"), "template value is replaced");
    assert!(env.contains("DB_USER=root\n"));
    assert!(env.contains("WP_ENV=development\n"));
}

#[test]
fn success_leaves_no_scratch_artifacts() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new()
        .with_body(SETUP_URL, &standard_archive())
        .with_body(SALTS_URL, SALTS_BODY.as_bytes());
    let log = Arc::new(CapturedLog::new());

    run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap();

    assert!(!fixture.exists(SCRATCH_DIR));
    assert!(!fixture.exists(".security"));
    assert!(!fixture.exists(".env.bak"));
}

#[test]
fn existing_files_are_backed_up_before_overwrite() {
    let fixture = ProjectFixture::new();
    fixture.write_file("public/index.php", "local edits\n");
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());

    run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap();

    assert_eq!(
        fixture.read_file("public/index.php"),
        "<?php // front controller\n"
    );
    assert_eq!(fixture.read_file("public/index.php.bak"), "local edits\n");
}

#[test]
fn missing_setup_url_fails_without_fetching() {
    let fixture = ProjectFixture::new();
    // An empty fetcher: any request at all would surface as a Fetch error.
    let log = Arc::new(CapturedLog::new());
    let config = ProvisionConfig {
        setup_url: String::new(),
        ..standard_config()
    };

    let err = run_pipeline(config, &fixture, FakeFetcher::new(), &log).unwrap_err();

    assert!(matches!(err, ProvisionError::Config(_)));
    assert!(!fixture.exists(SCRATCH_DIR));
}

#[test]
fn corrupt_archive_is_fatal_but_scratch_is_swept() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, b"this is not gzip");
    let log = Arc::new(CapturedLog::new());

    let err = run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap_err();

    assert!(matches!(err, ProvisionError::Extract { .. }));
    assert!(
        !fixture.exists(SCRATCH_DIR),
        "scratch must be swept on the failure edge"
    );
    assert_eq!(
        log.task_status("extract archive"),
        Some(TaskStatus::Failed)
    );
}

#[test]
fn missing_map_sources_are_skipped_with_a_warning() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());
    let config = ProvisionConfig {
        setup_map: SetupMap::from_pairs(vec![
            ("web".to_string(), "public".to_string()),
            ("not-in-bundle".to_string(), "elsewhere".to_string()),
        ]),
        ..standard_config()
    };

    run_pipeline(config, &fixture, fetcher, &log).unwrap();

    assert!(fixture.exists("public/index.php"));
    assert!(!fixture.exists("elsewhere"));
    assert!(
        log.at_level("warn")
            .iter()
            .any(|m| m.contains("not-in-bundle")),
        "missing source must be warned about"
    );
}

#[test]
fn failed_salts_fetch_is_advisory() {
    let fixture = ProjectFixture::new();
    // Salts URL configured but not served by the fake fetcher.
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());

    run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap();

    let env = fixture.read_file(".env");
    assert!(
        env.contains("# WPSALTS\n"),
        "marker must survive a failed fetch"
    );
    assert!(log.at_level("warn").iter().any(|m| m.contains("salts")));
}

#[test]
fn env_destination_follows_the_setup_map() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());
    let config = ProvisionConfig {
        setup_map: SetupMap::from_pairs(vec![(
            ".env".to_string(),
            "site/.env".to_string(),
        )]),
        ..standard_config()
    };

    run_pipeline(config, &fixture, fetcher, &log).unwrap();

    let env = fixture.read_file("site/.env");
    assert!(env.contains("DB_USER=root\n"));
    assert!(!fixture.exists(".env"), "default path must not be touched");
}

#[test]
fn missing_env_template_skips_env_configuration() {
    let fixture = ProjectFixture::new();
    let archive = build_archive(&[("setup/web/index.php", b"<?php\n" as &[u8])]);
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &archive);
    let log = Arc::new(CapturedLog::new());
    let config = ProvisionConfig {
        setup_map: SetupMap::from_pairs(vec![("web".to_string(), "public".to_string())]),
        ..standard_config()
    };

    run_pipeline(config, &fixture, fetcher, &log).unwrap();

    assert!(!fixture.exists(".env"));
    assert_eq!(
        log.task_status("configure env"),
        Some(TaskStatus::Skipped)
    );
}

#[test]
fn answers_override_env_defaults() {
    let fixture = ProjectFixture::new();
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());
    let answers = FixedAnswers::new()
        .with_answer("Database name", "shopdb")
        .with_answer("Domain", "shop.example");

    Pipeline::new(
        standard_config(),
        fixture.root_path().to_path_buf(),
        Arc::new(fetcher),
        Arc::new(answers),
        Arc::clone(&log) as Arc<dyn bvdb::logging::Log>,
    )
    .run()
    .unwrap();

    let env = fixture.read_file(".env");
    assert!(env.contains("DB_NAME=shopdb\n"));
    assert!(env.contains("DOMAIN=shop.example\n"));
    assert!(env.contains("WP_HOME=https://shop.example\n"));
}

#[test]
fn failure_during_env_configuration_still_sweeps_scratch() {
    let fixture = ProjectFixture::new();
    // An env template that is not valid UTF-8 makes the key/value rewrite
    // fail after fetch, extract, and copy have all succeeded.
    let archive = build_archive(&[("setup/.env", b"DB_NAME=\xff\xfe\n" as &[u8])]);
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &archive);
    let log = Arc::new(CapturedLog::new());
    let config = ProvisionConfig {
        salts_url: String::new(),
        setup_map: SetupMap::from_pairs(vec![(".env".to_string(), ".env".to_string())]),
        ..standard_config()
    };

    let err = run_pipeline(config, &fixture, fetcher, &log).unwrap_err();

    assert!(matches!(err, ProvisionError::Io { .. }));
    assert!(
        !fixture.exists(SCRATCH_DIR),
        "scratch must be swept when env configuration fails"
    );
    assert_eq!(log.task_status("configure env"), Some(TaskStatus::Failed));
}

#[test]
fn stale_legacy_artifacts_are_swept() {
    let fixture = ProjectFixture::new();
    fixture.write_file(".security/old.key", "stale");
    fixture.write_file(".env.bak", "stale");
    let fetcher = FakeFetcher::new().with_body(SETUP_URL, &standard_archive());
    let log = Arc::new(CapturedLog::new());

    run_pipeline(standard_config(), &fixture, fetcher, &log).unwrap();

    assert!(!fixture.exists(".security"));
    assert!(!fixture.exists(".env.bak"));
}
