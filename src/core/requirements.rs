use crate::core::deadline;
use crate::core::documents::{content_type_for, random_suffix, Document};
use crate::core::tenders::decode_rows;
use crate::domain::model::{
    NewRequirementSubmission, Ordering, RequirementSubmission, Table, UploadedFile,
};
use crate::domain::ports::{BlobStore, Clock, DataStore};
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::validate_file_extension;

pub const REQUIREMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx"];
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct RequirementsForm {
    pub tender_name: String,
    pub deadline: String,
    pub description: String,
    pub files: Vec<Document>,
}

/// Intake of client requirement submissions.
pub struct RequirementsService<S: DataStore, B: BlobStore, C: Clock> {
    store: S,
    blobs: B,
    clock: C,
    bucket: String,
    max_upload_bytes: u64,
}

impl<S: DataStore, B: BlobStore, C: Clock> RequirementsService<S, B, C> {
    pub fn new(store: S, blobs: B, clock: C, bucket: impl Into<String>) -> Self {
        Self {
            store,
            blobs,
            clock,
            bucket: bucket.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Drops files over the size limit and rejects unsupported types.
    /// Returns each kept file with its extension.
    fn accept_files(&self, files: Vec<Document>) -> Result<Vec<(Document, String)>> {
        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            if file.size() > self.max_upload_bytes {
                tracing::warn!(
                    "Skipping '{}': {} bytes exceeds the {} byte limit",
                    file.file_name,
                    file.size(),
                    self.max_upload_bytes
                );
                continue;
            }
            let extension =
                validate_file_extension("files", &file.file_name, REQUIREMENT_EXTENSIONS)?;
            accepted.push((file, extension));
        }
        Ok(accepted)
    }

    pub async fn submit(&self, form: RequirementsForm) -> Result<RequirementSubmission> {
        let tender_name = form.tender_name.trim().to_string();
        if tender_name.is_empty() {
            return Err(PortalError::validation(
                "tender_name",
                "Tender / RFP name is required",
            ));
        }
        let deadline = deadline::parse_deadline(&form.deadline)?;
        let files = self.accept_files(form.files)?;

        let mut uploaded = Vec::with_capacity(files.len());
        for (file, extension) in files {
            let object_path = format!(
                "{}-{}.{}",
                self.clock.now().timestamp_millis(),
                random_suffix(13),
                extension
            );
            let size = file.size();

            self.blobs
                .upload(
                    &self.bucket,
                    &object_path,
                    file.data,
                    content_type_for(&extension),
                )
                .await
                .map_err(|e| PortalError::UploadError {
                    file: file.file_name.clone(),
                    message: e.to_string(),
                })?;
            tracing::debug!("Uploaded '{}' as {}", file.file_name, object_path);

            uploaded.push(UploadedFile {
                name: file.file_name,
                url: self.blobs.public_url(&self.bucket, &object_path),
                size,
            });
        }

        let submission = NewRequirementSubmission {
            tender_name,
            deadline: deadline::format_iso(deadline),
            description: form.description.trim().to_string(),
            files: uploaded,
        };
        let row = self
            .store
            .insert(
                Table::RequirementsSubmissions,
                serde_json::to_value(&submission)?,
            )
            .await?;
        let stored: RequirementSubmission = serde_json::from_value(row)?;

        tracing::info!(
            "✅ Requirements for '{}' submitted with {} file(s)",
            stored.tender_name,
            stored.files.len()
        );
        Ok(stored)
    }

    pub async fn list_requests(&self) -> Result<Vec<RequirementSubmission>> {
        let rows = self
            .store
            .list(Table::RequirementsSubmissions, &Ordering::newest_first())
            .await?;
        decode_rows(Table::RequirementsSubmissions, rows)
    }
}
