//! JSON artifact encoding for proofrank

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{ArtifactError, Result};

const INDENT: &[u8] = b"    ";

/// Serializes `value` as four-space indented JSON.
pub fn to_pretty_json<T: Serialize>(value: &T, output: &mut dyn Write) -> serde_json::Result<()> {
    let mut serializer = Serializer::with_formatter(output, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)
}

/// Writes `value` to `path`, replacing any previous content.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let unwritable = |source: std::io::Error| ArtifactError::Unwritable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(unwritable)?;
    let mut writer = BufWriter::new(file);
    to_pretty_json(value, &mut writer).map_err(|e| unwritable(e.into()))?;
    writer.flush().map_err(unwritable)?;

    tracing::info!(path = %path.display(), "artifact saved");
    Ok(())
}

/// Reads and decodes the artifact at `path`.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ArtifactError::from_read(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
