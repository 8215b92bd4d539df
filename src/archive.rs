//! Gzip-compressed tar extraction.

use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{ProvisionError, Result};
use crate::fsops;

/// Path for the intermediate tar: the archive path with its `.gz` suffix
/// stripped (or `.tar` appended when the suffix is unexpectedly absent).
fn tar_path_for(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map_or_else(|| "archive.tar".to_string(), |n| n.to_string_lossy().into_owned());
    let tar_name = name
        .strip_suffix(".gz")
        .map_or_else(|| format!("{name}.tar"), ToString::to_string);
    archive.with_file_name(tar_name)
}

/// Decompress `archive` and unpack it into `dest_dir`.
///
/// `dest_dir` is recreated empty first, so contents from a previous run are
/// fully replaced. Decompression writes an intermediate tar file alongside
/// the archive; its path is returned so the caller can include it in cleanup.
///
/// # Errors
///
/// Recreating the destination is a [`ProvisionError::Io`]; any failure in the
/// decompress or unpack stages is wrapped into [`ProvisionError::Extract`]
/// with the underlying cause.
pub fn extract(archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
    fsops::remove_recursive(dest_dir)
        .map_err(|e| ProvisionError::io("clearing directory", dest_dir, e))?;
    std::fs::create_dir_all(dest_dir)
        .map_err(|e| ProvisionError::io("creating directory", dest_dir, e))?;

    let tar_path = tar_path_for(archive);
    decompress(archive, &tar_path).map_err(|source| ProvisionError::Extract {
        archive: archive.to_path_buf(),
        source,
    })?;
    unpack(&tar_path, dest_dir).map_err(|source| ProvisionError::Extract {
        archive: archive.to_path_buf(),
        source,
    })?;

    Ok(tar_path)
}

fn decompress(archive: &Path, tar_path: &Path) -> std::io::Result<()> {
    let compressed = std::fs::File::open(archive)?;
    let mut decoder = GzDecoder::new(std::io::BufReader::new(compressed));
    let mut out = std::fs::File::create(tar_path)?;
    std::io::copy(&mut decoder, &mut out)?;
    Ok(())
}

fn unpack(tar_path: &Path, dest_dir: &Path) -> std::io::Result<()> {
    let tar_file = std::fs::File::open(tar_path)?;
    tar::Archive::new(std::io::BufReader::new(tar_file)).unpack(dest_dir)
}
