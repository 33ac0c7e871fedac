//! Temporary file holding a turn's output schema.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// An output schema written to disk for `--output-schema`.
///
/// The file is readable by the owner only and is deleted when this value is
/// dropped.
#[derive(Debug)]
pub struct OutputSchemaFile {
    file: NamedTempFile,
}

impl OutputSchemaFile {
    /// Write `schema` as JSON to a fresh temporary file.
    pub fn create(schema: &Value) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("codex-output-schema-")
            .suffix(".json")
            .tempfile()
            .map_err(Error::io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(Error::io)?;
        }

        serde_json::to_writer(&mut file, schema)?;
        file.flush().map_err(Error::io)?;

        Ok(Self { file })
    }

    /// Path to pass to the CLI.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
