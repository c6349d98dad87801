use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// Write `content` next to `path` and rename it into place, so readers see
/// either the previous file or the complete new one.
pub async fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create dir failed: {}", dir.display()))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)
        .await
        .with_context(|| format!("write temp file failed: {}", tmp_path.display()))?;

    // TODO: rename over an open file can fail on Windows; retry once there.
    fs::rename(&tmp_path, path).await.with_context(|| {
        format!(
            "rename temp file to target failed: {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
