use serde::{Deserialize, Serialize};
use std::fmt;

/// Tables the portal reads and writes on the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tenders,
    SubmittedTenders,
    RequirementsSubmissions,
    AppSettings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Tenders => "tenders",
            Table::SubmittedTenders => "submitted_tenders",
            Table::RequirementsSubmissions => "requirements_submissions",
            Table::AppSettings => "app_settings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort order for list reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub ascending: bool,
}

impl Ordering {
    pub fn newest_first() -> Self {
        Self::desc("created_at")
    }

    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }
}

/// Primary key of a stored row. Tender tables use integer keys, the intake
/// table uses generated text keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(id.to_string()),
        }
    }
}

/// Anything carrying a deadline the countdown can be computed for.
pub trait DeadlineSubject {
    fn deadline(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    Pending,
    Submitted,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Pending => "pending",
            TenderStatus::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub date_submitted: String,
    pub name: String,
    pub deadline: String,
    pub quoted_amount: f64,
    #[serde(default)]
    pub our_submission_date: Option<String>,
    pub status: TenderStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
}

impl Tender {
    pub fn record_id(&self) -> RecordId {
        RecordId::Int(self.id)
    }

    pub fn is_submitted(&self) -> bool {
        self.status == TenderStatus::Submitted
    }
}

impl DeadlineSubject for Tender {
    fn deadline(&self) -> &str {
        &self.deadline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedTender {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub date_submitted: String,
    pub name: String,
    pub deadline: String,
    pub document_url: String,
    pub document_name: String,
}

impl DeadlineSubject for SubmittedTender {
    fn deadline(&self) -> &str {
        &self.deadline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSubmission {
    pub id: RecordId,
    #[serde(default)]
    pub created_at: Option<String>,
    pub tender_name: String,
    pub deadline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

impl DeadlineSubject for RequirementSubmission {
    fn deadline(&self) -> &str {
        &self.deadline
    }
}

// Insert and patch payloads. Only the columns the portal sets are sent; ids
// and created_at are assigned by the store.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub requirements: String,
    pub deadline: String,
    pub quoted_amount: f64,
    pub status: TenderStatus,
    pub date_submitted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubmittedTender {
    pub name: String,
    pub date_submitted: String,
    pub document_url: String,
    pub document_name: String,
    pub deadline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRequirementSubmission {
    pub tender_name: String,
    pub deadline: String,
    pub description: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderCompletion {
    pub status: TenderStatus,
    pub our_submission_date: String,
}

/// A composed contact message, ready for delivery by a notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tender_reads_store_row() {
        let row = serde_json::json!({
            "id": 7,
            "created_at": "2025-01-02T09:00:00+00:00",
            "date_submitted": "2025-01-02T09:00:00+00:00",
            "name": "Road resurfacing RFP",
            "deadline": "2025-02-01T17:00:00+00:00",
            "quoted_amount": 125000.5,
            "our_submission_date": null,
            "status": "pending",
            "description": "Phase 1",
            "requirements": "ISO 9001"
        });

        let tender: Tender = serde_json::from_value(row).unwrap();
        assert_eq!(tender.id, 7);
        assert_eq!(tender.status, TenderStatus::Pending);
        assert!(tender.our_submission_date.is_none());
        assert_eq!(tender.deadline(), "2025-02-01T17:00:00+00:00");
    }

    #[test]
    fn record_id_accepts_numbers_and_uuids() {
        let numeric: RecordId = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(numeric, RecordId::Int(42));

        let text: RecordId =
            serde_json::from_value(serde_json::json!("6f1c0b2e-1d2a-4c1e-9a57-8b0f1d2e3c4a"))
                .unwrap();
        assert_eq!(text.to_string(), "6f1c0b2e-1d2a-4c1e-9a57-8b0f1d2e3c4a");
        assert_eq!(RecordId::from("15"), RecordId::Int(15));
    }
}
