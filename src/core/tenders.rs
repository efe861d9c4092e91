use crate::core::deadline;
use crate::core::documents::{content_type_for, Document};
use crate::domain::model::{
    NewSubmittedTender, NewTender, Ordering, RecordId, SubmittedTender, Table, Tender,
    TenderCompletion, TenderStatus,
};
use crate::domain::ports::{BlobStore, Clock, DataStore};
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::validate_file_extension;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Document types accepted when a tender is marked complete.
pub const COMPLETION_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Raw input for a new tender, as typed into the create form.
#[derive(Debug, Clone, Default)]
pub struct TenderForm {
    pub name: String,
    pub description: String,
    pub requirements: String,
    pub deadline: String,
    pub quoted_amount: String,
}

impl TenderForm {
    fn into_new_tender(self, now: chrono::DateTime<chrono::Utc>) -> Result<NewTender> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PortalError::validation("name", "Tender name is required"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(PortalError::validation("description", "Description is required"));
        }

        let quoted_amount: f64 = self.quoted_amount.trim().parse().map_err(|_| {
            PortalError::validation(
                "quoted_amount",
                format!("'{}' is not a number", self.quoted_amount),
            )
        })?;
        if !quoted_amount.is_finite() || quoted_amount < 0.0 {
            return Err(PortalError::validation(
                "quoted_amount",
                "Quoted amount must be zero or more",
            ));
        }

        let deadline = deadline::parse_deadline(&self.deadline)?;

        Ok(NewTender {
            name: name.to_string(),
            description: description.to_string(),
            requirements: self.requirements.trim().to_string(),
            deadline: deadline::format_iso(deadline),
            quoted_amount,
            status: TenderStatus::Pending,
            date_submitted: deadline::format_iso(now),
        })
    }
}

pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(PortalError::from))
        .collect::<Result<Vec<T>>>()
        .inspect_err(|e| tracing::error!("Unreadable row in {}: {}", table, e))
}

pub struct TenderService<S: DataStore, B: BlobStore, C: Clock> {
    store: S,
    blobs: B,
    clock: C,
    bucket: String,
}

impl<S: DataStore, B: BlobStore, C: Clock> TenderService<S, B, C> {
    pub fn new(store: S, blobs: B, clock: C, bucket: impl Into<String>) -> Self {
        Self {
            store,
            blobs,
            clock,
            bucket: bucket.into(),
        }
    }

    pub async fn list_tenders(&self) -> Result<Vec<Tender>> {
        let rows = self
            .store
            .list(Table::Tenders, &Ordering::newest_first())
            .await?;
        decode_rows(Table::Tenders, rows)
    }

    pub async fn list_submitted(&self) -> Result<Vec<SubmittedTender>> {
        let rows = self
            .store
            .list(Table::SubmittedTenders, &Ordering::newest_first())
            .await?;
        decode_rows(Table::SubmittedTenders, rows)
    }

    pub async fn find_tender(&self, id: i64) -> Result<Tender> {
        let rows = self
            .store
            .find_by(Table::Tenders, "id", &id.to_string())
            .await?;
        decode_rows::<Tender>(Table::Tenders, rows)?
            .into_iter()
            .next()
            .ok_or_else(|| PortalError::NotFound {
                table: Table::Tenders.name().to_string(),
                id: id.to_string(),
            })
    }

    pub async fn create_tender(&self, form: TenderForm) -> Result<Tender> {
        let new_tender = form.into_new_tender(self.clock.now())?;
        tracing::info!("Creating tender '{}'", new_tender.name);

        let row = self
            .store
            .insert(Table::Tenders, serde_json::to_value(&new_tender)?)
            .await?;
        let tender: Tender = serde_json::from_value(row)?;

        tracing::info!("✅ Tender {} created", tender.id);
        Ok(tender)
    }

    /// Uploads our submission document, records it as a submitted tender and
    /// marks the tender as submitted.
    pub async fn complete_tender(&self, tender: &Tender, document: Document) -> Result<SubmittedTender> {
        if tender.is_submitted() {
            return Err(PortalError::validation(
                "status",
                format!("Tender {} is already submitted", tender.id),
            ));
        }

        let extension =
            validate_file_extension("document", &document.file_name, COMPLETION_EXTENSIONS)?;
        let now = self.clock.now();
        let object_path = format!(
            "submissions/completed-{}-{}.{}",
            tender.id,
            now.timestamp_millis(),
            extension
        );

        tracing::info!(
            "Uploading '{}' ({} bytes) for tender {}",
            document.file_name,
            document.size(),
            tender.id
        );
        self.blobs
            .upload(
                &self.bucket,
                &object_path,
                document.data,
                content_type_for(&extension),
            )
            .await
            .map_err(|e| PortalError::UploadError {
                file: document.file_name.clone(),
                message: e.to_string(),
            })?;
        let document_url = self.blobs.public_url(&self.bucket, &object_path);

        let submission = NewSubmittedTender {
            name: tender.name.clone(),
            date_submitted: tender.date_submitted.clone(),
            document_url,
            document_name: document.file_name,
            deadline: tender.deadline.clone(),
        };
        let row = self
            .store
            .insert(Table::SubmittedTenders, serde_json::to_value(&submission)?)
            .await?;
        let submitted: SubmittedTender = serde_json::from_value(row)?;

        let completion = TenderCompletion {
            status: TenderStatus::Submitted,
            our_submission_date: deadline::format_iso(now),
        };
        let marked = self
            .store
            .update(
                Table::Tenders,
                &tender.record_id(),
                serde_json::to_value(&completion)?,
            )
            .await;

        // A submitted row only exists for a tender marked as submitted.
        if let Err(e) = marked {
            tracing::error!(
                "❌ Could not mark tender {} as submitted: {}; removing submitted row {}",
                tender.id,
                e,
                submitted.id
            );
            let rollback = self
                .store
                .delete(Table::SubmittedTenders, &RecordId::Int(submitted.id))
                .await;
            if let Err(rollback_err) = rollback {
                tracing::error!(
                    "❌ Submitted row {} for tender {} is orphaned: {}",
                    submitted.id,
                    tender.id,
                    rollback_err
                );
            }
            return Err(e);
        }

        tracing::info!("✅ Tender {} marked as submitted", tender.id);
        Ok(submitted)
    }

    pub async fn delete_tender(&self, id: i64) -> Result<()> {
        self.store.delete(Table::Tenders, &RecordId::Int(id)).await?;
        tracing::info!("🗑️ Tender {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn form() -> TenderForm {
        TenderForm {
            name: "  Harbour dredging ".to_string(),
            description: "Dredge berth 4".to_string(),
            requirements: String::new(),
            deadline: "2025-04-01T17:00".to_string(),
            quoted_amount: "50000.00".to_string(),
        }
    }

    #[test]
    fn form_is_normalised() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tender = form().into_new_tender(now).unwrap();
        assert_eq!(tender.name, "Harbour dredging");
        assert_eq!(tender.deadline, "2025-04-01T17:00:00.000Z");
        assert_eq!(tender.date_submitted, "2025-03-01T12:00:00.000Z");
        assert_eq!(tender.status, TenderStatus::Pending);
        assert_eq!(tender.quoted_amount, 50000.0);
    }

    #[test]
    fn form_rejects_bad_input() {
        let now = Utc::now();

        let mut bad_deadline = form();
        bad_deadline.deadline = "next friday".to_string();
        assert!(matches!(
            bad_deadline.into_new_tender(now),
            Err(PortalError::Deadline(_))
        ));

        let mut bad_amount = form();
        bad_amount.quoted_amount = "lots".to_string();
        assert!(bad_amount.into_new_tender(now).is_err());

        let mut negative = form();
        negative.quoted_amount = "-1".to_string();
        assert!(negative.into_new_tender(now).is_err());

        let mut unnamed = form();
        unnamed.name = "   ".to_string();
        assert!(unnamed.into_new_tender(now).is_err());
    }
}
