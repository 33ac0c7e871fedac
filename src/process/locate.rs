//! Locating the codex executable.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::{Error, Result};

/// Name of the CLI binary on this platform.
pub const CODEX_BINARY: &str = if cfg!(windows) { "codex.exe" } else { "codex" };

/// Target triple of the bundled binary built for this platform, if any.
pub fn target_triple() -> Option<&'static str> {
    let (arch, os) = (std::env::consts::ARCH, std::env::consts::OS);
    match (arch, os) {
        ("x86_64", "linux" | "android") => Some("x86_64-unknown-linux-musl"),
        ("aarch64", "linux" | "android") => Some("aarch64-unknown-linux-musl"),
        ("x86_64", "macos") => Some("x86_64-apple-darwin"),
        ("aarch64", "macos") => Some("aarch64-apple-darwin"),
        ("x86_64", "windows") => Some("x86_64-pc-windows-msvc"),
        ("aarch64", "windows") => Some("aarch64-pc-windows-msvc"),
        _ => None,
    }
}

/// Path of the bundled binary relative to `base`.
pub fn bundled_path(base: &Path, triple: &str) -> PathBuf {
    base.join("vendor")
        .join(triple)
        .join("codex")
        .join(CODEX_BINARY)
}

/// Resolve the executable to spawn.
///
/// Order: the configured `cli_path`, then a bundled binary next to the
/// current executable, then `PATH` as seen in `env` (the child's environment).
pub fn resolve_executable(
    config: &ClientConfig,
    env: &HashMap<OsString, OsString>,
) -> Result<PathBuf> {
    if let Some(path) = config.cli_path() {
        return Ok(path.clone());
    }

    let mut searched = Vec::new();

    if let Some(triple) = target_triple() {
        let bundled = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| bundled_path(dir, triple)));
        if let Some(bundled) = bundled {
            if bundled.is_file() {
                return Ok(bundled);
            }
            searched.push(bundled.display().to_string());
        }
    }

    let path_var = env
        .get(OsStr::new("PATH"))
        .map(OsString::as_os_str)
        .unwrap_or_default();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match which::which_in(CODEX_BINARY, Some(path_var), cwd) {
        Ok(found) => Ok(found),
        Err(_) => {
            searched.push(format!("PATH={}", path_var.to_string_lossy()));
            Err(Error::CliNotFound {
                searched: searched.join(", "),
            })
        }
    }
}
