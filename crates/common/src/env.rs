//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the router is built.

use std::path::Path;

use tracing::warn;

/// Check that the static assets directory exists; a missing one is not fatal.
///
/// Returns whether the directory was found so callers can skip mounting it.
pub async fn ensure_static_dir(static_dir: &str) -> bool {
    match tokio::fs::metadata(static_dir).await {
        Ok(meta) if meta.is_dir() => true,
        Ok(_) => {
            warn!(%static_dir, "static path is not a directory; /static will 404");
            false
        }
        Err(_) => {
            warn!(%static_dir, "static assets directory not found; /static will 404");
            false
        }
    }
}

/// Ensure an optional seed file is readable before the store is built.
pub async fn ensure_seed_file(seed_path: Option<&str>) -> anyhow::Result<()> {
    let Some(path) = seed_path else { return Ok(()) };
    if !Path::new(path).is_file() {
        return Err(anyhow::anyhow!("seed file {path} does not exist"));
    }
    Ok(())
}
