use bytes::Bytes;

use crate::error::{Error, Result};
use crate::types::FeatureId;

/// Extensions the backend accepts for uploads.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "docx", "csv", "zip"];

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name as presented to the backend.
    pub name: String,

    /// MIME type, if known.
    pub content_type: Option<String>,

    /// File contents.
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create a new upload from an in-memory buffer.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&extension_of(&name)).map(String::from);
        Self {
            name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk.
    pub fn read(path: &str) -> Result<Self> {
        let name = std::path::Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .map(String::from)
            .ok_or_else(|| Error::config(format!("{path} does not name a file")))?;
        let bytes =
            std::fs::read(path).map_err(|err| Error::io(format!("failed to read {path}"), err))?;
        Ok(Self::new(name, bytes))
    }

    /// The lowercased text after the last `.` of the file name.
    ///
    /// A name without any `.` is its own extension.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// Checks the extension against [`ALLOWED_EXTENSIONS`].
    pub fn check_allowed(&self) -> Result<()> {
        let extension = self.extension();
        if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(Error::unsupported_file_type(extension))
        }
    }
}

fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "zip" => Some("application/zip"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Body of a multipart upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    /// The file part.
    pub file: UploadFile,

    /// Plain text parts, in order.
    pub fields: Vec<(String, String)>,
}

impl MultipartForm {
    /// Build the upload form carrying `{file, feature, session_id}`.
    pub fn upload(file: UploadFile, feature: &FeatureId, session_id: &str) -> Self {
        Self {
            file,
            fields: vec![
                ("feature".to_string(), feature.to_string()),
                ("session_id".to_string(), session_id.to_string()),
            ],
        }
    }

    /// Look up a text field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
