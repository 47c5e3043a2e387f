// JSON import/export
//
// Output is pretty-printed with two-space indent; non-ASCII text is written
// literally.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::IoError;

pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    serde_json::to_string_pretty(value).map_err(|e| IoError::Json(e.to_string()))
}

pub fn export<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), IoError> {
    let mut content = to_pretty_string(value)?;
    content.push('\n');
    crate::file::write_text(path, &content)
}

pub fn import<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let content = crate::file::read_text(path)?;
    serde_json::from_str(&content)
        .map_err(|e| IoError::Json(format!("{}: {e}", path.display())))
}
