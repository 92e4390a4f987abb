use std::path::{Path, PathBuf};

use tracing::debug;

/// Maps an image URL path under `prefix` onto a file under `root`.
/// Paths outside the prefix, or that try to climb out of it, map to nothing.
pub fn local_path(root: &Path, prefix: &str, url_path: &str) -> Option<PathBuf> {
    let prefix = prefix.trim_end_matches('/');
    let rest = url_path.strip_prefix(prefix)?.trim_start_matches('/');
    if rest.is_empty() || rest.split('/').any(|part| part.is_empty() || part == "..") {
        return None;
    }
    Some(root.join(rest))
}

/// Whether the image behind `url_path` exists. A missing file is a normal
/// outcome, not an error.
pub async fn probe_image(root: &Path, prefix: &str, url_path: &str) -> bool {
    let Some(path) = local_path(root, prefix, url_path) else {
        debug!("image path outside asset prefix: {url_path}");
        return false;
    };
    match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.is_file(),
        Err(err) => {
            debug!("image unavailable: {path:?} -> {err}");
            false
        }
    }
}
