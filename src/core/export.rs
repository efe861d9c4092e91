use crate::core::dashboard::{countdown_for, NO_COUNTDOWN};
use crate::domain::model::Tender;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct TenderExportRow<'a> {
    id: i64,
    name: &'a str,
    date_submitted: &'a str,
    deadline: &'a str,
    time_remaining: String,
    tier: String,
    quoted_amount: f64,
    status: &'a str,
}

/// Writes one CSV row per tender, with countdowns evaluated at `now`.
pub fn write_tenders_csv<W: Write>(writer: W, tenders: &[Tender], now: DateTime<Utc>) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for tender in tenders {
        let countdown = countdown_for(tender, now);
        csv_writer.serialize(TenderExportRow {
            id: tender.id,
            name: &tender.name,
            date_submitted: &tender.date_submitted,
            deadline: &tender.deadline,
            time_remaining: countdown
                .as_ref()
                .map(|c| c.label.clone())
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
            tier: countdown
                .as_ref()
                .map(|c| c.tier.to_string())
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
            quoted_amount: tender.quoted_amount,
            status: tender.status.as_str(),
        })?;
    }

    csv_writer.flush()?;
    Ok(tenders.len())
}

pub fn export_tenders<P: AsRef<Path>>(path: P, tenders: &[Tender], now: DateTime<Utc>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    let count = write_tenders_csv(file, tenders, now)?;
    tracing::info!("📁 Exported {} tenders to {}", count, path.display());
    Ok(count)
}
