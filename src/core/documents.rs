use crate::utils::error::{PortalError, Result};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::path::Path;

/// A file picked for upload: its original name and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PortalError::validation("document", format!("'{}' is not a file", path.display()))
            })?
            .to_string();
        let data = tokio::fs::read(path).await?;
        Ok(Self { file_name, data })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Lower-case alphanumeric suffix that keeps object names unique.
pub fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
