//! `.env` seeding: remote marker blocks plus interactive answers.

use std::path::Path;

use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::fetch::RemoteFetcher;
use crate::logging::Log;
use crate::patch::{self, PatchOutcome};
use crate::prompt::AnswerProvider;

/// Marker token replaced by the fetched salts block.
pub const SALTS_MARKER: &str = "WPSALTS";
/// Marker token replaced by the fetched licenses block.
pub const LICENSES_MARKER: &str = "WPLICENSES";

/// Configure the env file at `env_path`.
///
/// Returns `false` when the file does not exist — that is a soft skip, not an
/// error, since an archive without an env template simply has nothing to
/// configure. Otherwise injects the two remote marker blocks (tolerating
/// unconfigured or failing fetches) and writes the eight answered key/value
/// pairs.
///
/// # Errors
///
/// Fatal only on filesystem failures while rewriting the file; fetch
/// failures here are advisories that leave the marker line untouched.
pub fn configure(
    env_path: &Path,
    config: &ProvisionConfig,
    fetcher: &dyn RemoteFetcher,
    answers: &dyn AnswerProvider,
    log: &dyn Log,
) -> Result<bool> {
    if !env_path.is_file() {
        log.warn(&format!(
            "no env file at {}; skipping env configuration",
            env_path.display()
        ));
        return Ok(false);
    }

    inject_remote(env_path, "salts", &config.salts_url, SALTS_MARKER, fetcher, log)?;
    inject_remote(
        env_path,
        "licenses",
        &config.licenses_url,
        LICENSES_MARKER,
        fetcher,
        log,
    )?;

    let db_user = answers.ask("Database user", "root");
    let db_password = answers.ask("Database password", "");
    let db_name = answers.ask("Database name", "wordpress");
    let db_prefix = answers.ask("Table prefix", "vmst_");
    let db_host = answers.ask("Database host", "127.0.0.1");
    let domain = answers.ask("Domain", &default_domain(env_path));
    let site_url = answers.ask("Site URL", &format!("https://{domain}"));
    let environment = answers.ask("Environment", "development");

    patch::set_key_value(env_path, "DB_USER", &db_user)?;
    patch::set_key_value(env_path, "DB_PASSWORD", &quote_password(&db_password))?;
    patch::set_key_value(env_path, "DB_NAME", &db_name)?;
    patch::set_key_value(env_path, "DB_PREFIX", &db_prefix)?;
    patch::set_key_value(env_path, "DB_HOST", &db_host)?;
    patch::set_key_value(env_path, "DOMAIN", &domain)?;
    patch::set_key_value(env_path, "WP_HOME", &site_url)?;
    patch::set_key_value(env_path, "WP_ENV", &environment)?;

    log.info(&format!("configured {}", env_path.display()));
    Ok(true)
}

/// Fetch one optional remote block and inject it at its marker.
///
/// An unconfigured URL or a failed fetch leaves the existing marker line
/// untouched and logs an advisory; only the file rewrite itself can fail.
fn inject_remote(
    env_path: &Path,
    what: &str,
    url: &str,
    marker: &str,
    fetcher: &dyn RemoteFetcher,
    log: &dyn Log,
) -> Result<()> {
    if url.trim().is_empty() {
        log.debug(&format!("no {what} URL configured; leaving {marker} marker untouched"));
        return Ok(());
    }

    let body = match fetcher.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            log.warn(&format!("could not fetch {what} from {url}: {e}; leaving {marker} marker untouched"));
            return Ok(());
        }
    };
    let content = String::from_utf8_lossy(&body);
    if content.trim().is_empty() {
        log.warn(&format!("{what} response from {url} was empty; leaving {marker} marker untouched"));
        return Ok(());
    }

    match patch::inject_marker(env_path, marker, &content)? {
        PatchOutcome::Replaced => log.debug(&format!("replaced {marker} marker with fetched {what}")),
        PatchOutcome::Appended | PatchOutcome::NotFound => {
            log.warn(&format!("no {marker} marker found; appended fetched {what}"));
        }
    }
    Ok(())
}

/// Default domain: the name of the directory containing the env file.
fn default_domain(env_path: &Path) -> String {
    env_path
        .parent()
        .and_then(Path::file_name)
        .map_or_else(|| "localhost".to_string(), |n| n.to_string_lossy().into_owned())
}

/// Wrap a non-empty password in double quotes unless it already is, so
/// values with spaces or special characters stay a single `KEY=value` token.
fn quote_password(password: &str) -> String {
    if password.is_empty()
        || (password.len() >= 2 && password.starts_with('"') && password.ends_with('"'))
    {
        password.to_string()
    } else {
        format!("\"{password}\"")
    }
}
