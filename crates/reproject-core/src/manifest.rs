//! Loading the template manifest and writing the result

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Template read by default.
pub const DEFAULT_TEMPLATE: &str = "package.in.json";

/// Manifest written by default.
pub const DEFAULT_OUTPUT: &str = "package.json";

/// Key of the manifest's name field.
pub const NAME_KEY: &str = "name";

/// Key of the scripts mapping.
pub const SCRIPTS_KEY: &str = "scripts";

/// Key of the repository sub-object merged onto the top level.
pub const DEFAULT_REPO_KEY: &str = "pbrepo";

/// A JSON manifest, keeping the key order of the template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    /// Parse manifest text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value)
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::invalid(format!(
                "top level must be an object, found {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Set `key`, replacing an existing value in place or appending a new key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Remove `key`, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// The manifest's `name`, when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Pretty-printed JSON with two-space indentation and a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.fields)?;
        out.push('\n');
        Ok(out)
    }
}

/// Human-readable name of a JSON value's variant.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read and parse the template at `path`.
pub async fn load_template(path: &Path) -> Result<Manifest> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    tracing::debug!(?path, bytes = bytes.len(), "Loaded template");

    let text = String::from_utf8_lossy(&bytes);
    Manifest::parse(&text, path)
}

/// Write `content` to `path`, replacing any existing file.
///
/// The content goes to a locked temp file beside the target which is then
/// renamed over it, so readers never see a partial manifest.
pub fn write_manifest(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let result = write_locked(&temp_path, content)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        tracing::debug!(?path, bytes = content.len(), "Wrote manifest");
    }
    result
}

fn write_locked(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.unlock().map_err(|e| Error::io(temp_path, e))
}
