use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// * `None` falls back to `<platform home>/<default_subdir>`.
/// * A leading `~` is expanded to the platform home.
/// * Relative paths are resolved against the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        None => platform_home()?.join(default_subdir),
        Some(raw) => expand_user(raw.trim())?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home_dir {}", absolute.display()))?;
    }
    Ok(absolute)
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = dirs::data_dir();
    #[cfg(not(target_os = "windows"))]
    let home = dirs::home_dir();

    home.ok_or_else(|| anyhow!("platform home directory is not available"))
}

fn expand_user(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}
