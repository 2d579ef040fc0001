//! Reading TOML/JSON source files with content digests.

use std::fs;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Supported on-disk formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Toml,
    Json,
}

impl SourceFormat {
    /// Format for `path`; files without a recognized extension are TOML.
    pub fn for_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("toml") | None => Some(Self::Toml),
            Some(_) => None,
        }
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub value: Value,
    /// SHA-256 of the raw bytes, hex encoded
    pub digest: String,
}

/// Failure while reading or parsing a source file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Read `path` and parse it as `format`, returning the JSON value and digest.
pub fn load(path: &Path, format: SourceFormat) -> Result<LoadedSource, SourceError> {
    let bytes = fs::read(path)?;
    let digest = sha256_hex(&bytes);

    let contents = String::from_utf8(bytes)
        .map_err(|e| SourceError::Parse(format!("Invalid UTF-8: {}", e)))?;

    let value = parse_str(&contents, format)?;
    Ok(LoadedSource { value, digest })
}

/// Parse text as `format` into a JSON value.
pub fn parse_str(contents: &str, format: SourceFormat) -> Result<Value, SourceError> {
    match format {
        SourceFormat::Toml => {
            let toml_value: toml::Value = toml::from_str(contents)
                .map_err(|e| SourceError::Parse(format!("TOML parse error: {}", e)))?;
            Ok(toml_to_json(toml_value))
        }
        SourceFormat::Json => serde_json::from_str(contents)
            .map_err(|e| SourceError::Parse(format!("JSON parse error: {}", e))),
    }
}

/// Convert a TOML value to JSON. Datetimes become strings.
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}
