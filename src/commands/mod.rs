pub mod provision;

use anyhow::Result;

use crate::cli::GlobalOpts;

/// Resolve the project root directory from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if an explicit root does not exist, or if the current
/// directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<std::path::PathBuf> {
    if let Some(root) = &global.root {
        anyhow::ensure!(
            root.is_dir(),
            "project root {} is not a directory",
            root.display()
        );
        return Ok(root.clone());
    }

    Ok(std::env::current_dir()?)
}
