//! Line-oriented text patching for foreign config formats.
//!
//! The files patched here (PHP config, `.env`) are formats this tool does not
//! parse. Patching is deliberately shallow: a line either matches a pattern,
//! an exact `KEY=` prefix, or contains a marker token, and the whole line is
//! replaced. Comments, quoting, and everything outside the matched line stay
//! untouched. Do not upgrade this to structured parsing — the shallow
//! contract is the point.
//!
//! Every operation reads the whole file, transforms it in memory, and writes
//! it back; a read or write failure is fatal to the run.

use std::path::Path;

use regex::Regex;

use crate::error::{ProvisionError, Result};

/// What a patch operation did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// A matching line was replaced in place.
    Replaced,
    /// No match was found; the content was appended at the end.
    Appended,
    /// No match was found and the file was left unchanged.
    NotFound,
}

/// Split `text` into lines, reporting whether it ended with a newline.
///
/// Splitting on `'\n'` (rather than `lines()`) keeps any `\r` bytes inside
/// the line content, so lines we do not touch are written back byte-for-byte.
fn split_lines(text: &str) -> (Vec<&str>, bool) {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let had_newline = matches!(lines.last(), Some(&"")) && text.ends_with('\n');
    if had_newline {
        lines.pop();
    }
    (lines, had_newline)
}

fn join_lines(lines: &[String], trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ProvisionError::io("reading", path, e))
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| ProvisionError::io("writing", path, e))
}

/// Drop blank trailing lines so the file ends with exactly one newline once
/// the appended lines are written.
fn normalize_tail(lines: &mut Vec<String>) {
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
}

/// Replace the first line matching `pattern` with `replacement`.
///
/// With zero matches the file is left byte-identical and
/// [`PatchOutcome::NotFound`] is returned; the caller decides whether that is
/// worth a warning. Never appends.
///
/// # Errors
///
/// Fatal on read or write failure.
pub fn replace_assignment(path: &Path, pattern: &Regex, replacement: &str) -> Result<PatchOutcome> {
    let text = read(path)?;
    let (raw_lines, trailing) = split_lines(&text);
    let mut lines: Vec<String> = raw_lines.iter().map(ToString::to_string).collect();

    let Some(found) = lines.iter().position(|line| pattern.is_match(line)) else {
        return Ok(PatchOutcome::NotFound);
    };
    if let Some(slot) = lines.get_mut(found) {
        *slot = replacement.to_string();
    }
    write(path, &join_lines(&lines, trailing))?;
    Ok(PatchOutcome::Replaced)
}

/// Set `key` to `value` in a `KEY=value` file.
///
/// The first line of exact form `KEY=...` is replaced; if none exists,
/// `KEY=value` is appended as a new trailing line after normalizing the file
/// to end with exactly one newline.
///
/// # Errors
///
/// Fatal on read or write failure.
pub fn set_key_value(path: &Path, key: &str, value: &str) -> Result<PatchOutcome> {
    let text = read(path)?;
    let (raw_lines, mut trailing) = split_lines(&text);
    let mut lines: Vec<String> = raw_lines.iter().map(ToString::to_string).collect();

    let prefix = format!("{key}=");
    let entry = format!("{key}={value}");

    let outcome = if let Some(slot) = lines.iter_mut().find(|line| line.starts_with(&prefix)) {
        *slot = entry;
        PatchOutcome::Replaced
    } else {
        normalize_tail(&mut lines);
        lines.push(entry);
        trailing = true;
        PatchOutcome::Appended
    };

    write(path, &join_lines(&lines, trailing))?;
    Ok(outcome)
}

/// Replace the first line containing `token` with `content`.
///
/// `content` is trimmed of trailing whitespace and may span multiple lines;
/// it replaces the marker line wholesale. If no line carries the token the
/// content is appended as a trailing block instead.
///
/// # Errors
///
/// Fatal on read or write failure. Empty `content` is a caller error
/// ([`ProvisionError::Config`]): optional-fetch skips must be resolved before
/// calling this.
pub fn inject_marker(path: &Path, token: &str, content: &str) -> Result<PatchOutcome> {
    let content = content.trim_end();
    if content.is_empty() {
        return Err(ProvisionError::Config(format!(
            "empty content for marker '{token}'"
        )));
    }

    let text = read(path)?;
    let (raw_lines, mut trailing) = split_lines(&text);
    let mut lines: Vec<String> = raw_lines.iter().map(ToString::to_string).collect();
    let block: Vec<String> = content.split('\n').map(ToString::to_string).collect();

    let outcome = if let Some(found) = lines.iter().position(|line| line.contains(token)) {
        lines.splice(found..=found, block);
        PatchOutcome::Replaced
    } else {
        normalize_tail(&mut lines);
        lines.extend(block);
        trailing = true;
        PatchOutcome::Appended
    };

    write(path, &join_lines(&lines, trailing))?;
    Ok(outcome)
}
