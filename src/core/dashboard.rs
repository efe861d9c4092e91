//! Text rendering of the dashboard tabs.
//!
//! The state to draw is passed in on every call together with the instant to
//! evaluate countdowns at, so one render never depends on a previous one.

use crate::core::deadline::{self, Countdown, Tier};
use crate::domain::model::{DeadlineSubject, RequirementSubmission, SubmittedTender, Tender};
use crate::utils::error::PortalError;
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

/// Placeholder for a countdown that cannot be computed.
pub const NO_COUNTDOWN: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tenders,
    Submitted,
    Requests,
}

impl Tab {
    /// Tick interval matching the resolution of the tab's countdowns.
    pub fn default_refresh(&self) -> Duration {
        match self {
            Tab::Tenders | Tab::Requests => Duration::from_secs(60),
            Tab::Submitted => Duration::from_secs(1),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Tenders => "Active Tenders & RFPs",
            Tab::Submitted => "Your Submitted Tenders",
            Tab::Requests => "Incoming Requests",
        }
    }
}

impl FromStr for Tab {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tenders" => Ok(Tab::Tenders),
            "submitted" => Ok(Tab::Submitted),
            "requests" => Ok(Tab::Requests),
            other => Err(PortalError::validation(
                "tab",
                format!("unknown tab '{}', expected tenders, submitted or requests", other),
            )),
        }
    }
}

/// Everything one frame needs.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub tab: Tab,
    pub tenders: Vec<Tender>,
    pub submitted: Vec<SubmittedTender>,
    pub requests: Vec<RequirementSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub active: usize,
    pub completed: usize,
}

impl DashboardStats {
    /// Active means the deadline is still ahead; a tender whose deadline
    /// cannot be read is not counted as active.
    pub fn compute(tenders: &[Tender], now: DateTime<Utc>) -> Self {
        let active = tenders
            .iter()
            .filter(|t| {
                deadline::parse_deadline(&t.deadline)
                    .map(|d| d > now)
                    .unwrap_or(false)
            })
            .count();
        let completed = tenders.iter().filter(|t| t.is_submitted()).count();

        Self { active, completed }
    }
}

pub fn countdown_for<S: DeadlineSubject>(subject: &S, now: DateTime<Utc>) -> Option<Countdown> {
    match deadline::evaluate(subject.deadline(), now) {
        Ok(countdown) => Some(countdown),
        Err(e) => {
            tracing::debug!("Skipping countdown: {}", e);
            None
        }
    }
}

/// Whole days between our submission and the deadline.
pub fn days_early(tender: &Tender) -> Option<i64> {
    let submitted_at = deadline::parse_deadline(tender.our_submission_date.as_deref()?).ok()?;
    let deadline = deadline::parse_deadline(&tender.deadline).ok()?;
    Some((deadline - submitted_at).num_days())
}

pub fn status_badge(tender: &Tender) -> String {
    if !tender.is_submitted() {
        return "In Progress".to_string();
    }

    match (&tender.our_submission_date, days_early(tender)) {
        (None, _) => "Submitted 0 days early".to_string(),
        (Some(_), Some(days)) => format!("Submitted {} days early", days),
        (Some(_), None) => "Submitted".to_string(),
    }
}

/// `$` plus the amount grouped in thousands, at most two decimals, trailing
/// zeros dropped: `$50,000`, `$1,234.5`.
pub fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = match fraction {
        0 => String::new(),
        f if f % 10 == 0 => format!(".{}", f / 10),
        f => format!(".{:02}", f),
    };

    format!("{}${}{}", sign, grouped, fraction)
}

fn format_instant(value: &str, offset: &FixedOffset, pattern: &str) -> String {
    match deadline::parse_deadline(value) {
        Ok(instant) => instant.with_timezone(offset).format(pattern).to_string(),
        Err(_) => value.to_string(),
    }
}

/// `Mar 1, 2025`
pub fn format_date(value: &str, offset: &FixedOffset) -> String {
    format_instant(value, offset, "%b %-d, %Y")
}

/// `Mar 1, 2025 17:00`
pub fn format_date_time(value: &str, offset: &FixedOffset) -> String {
    format_instant(value, offset, "%b %-d, %Y %H:%M")
}

pub fn render(state: &ViewState, now: DateTime<Utc>, offset: &FixedOffset) -> String {
    match state.tab {
        Tab::Tenders => render_tenders(&state.tenders, now, offset),
        Tab::Submitted => render_submitted(&state.submitted, now, offset),
        Tab::Requests => render_requests(&state.requests, now, offset),
    }
}

pub fn render_tenders(tenders: &[Tender], now: DateTime<Utc>, offset: &FixedOffset) -> String {
    let stats = DashboardStats::compute(tenders, now);
    let mut out = String::new();
    let _ = writeln!(out, "{}", Tab::Tenders.title());
    let _ = writeln!(
        out,
        "Active Tenders: {}    Completed: {}",
        stats.active, stats.completed
    );
    let tiers: Vec<String> = tier_summary(tenders, now)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(tier, count)| format!("{}: {}", tier, count))
        .collect();
    if !tiers.is_empty() {
        let _ = writeln!(out, "{}", tiers.join("    "));
    }
    let _ = writeln!(out);

    let mut table = TextTable::new(&[
        "ID",
        "Date Submitted",
        "Tender / RFP Name",
        "Deadline",
        "Time Remaining",
        "Urgency",
        "Quoted Amount",
        "Status",
    ]);
    for tender in tenders {
        let countdown = countdown_for(tender, now);
        table.push(vec![
            tender.id.to_string(),
            format_date(&tender.date_submitted, offset),
            tender.name.clone(),
            format_date_time(&tender.deadline, offset),
            countdown
                .as_ref()
                .map(|c| c.label.clone())
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
            countdown
                .as_ref()
                .map(|c| c.tier.to_string())
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
            format_amount(tender.quoted_amount),
            status_badge(tender),
        ]);
    }
    out.push_str(&table.render("No active projects. Create one to get started."));
    out
}

pub fn render_submitted(
    tenders: &[SubmittedTender],
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Tab::Submitted.title());
    let _ = writeln!(out);

    let mut table = TextTable::new(&[
        "Date Submitted",
        "Tender / RFP Name",
        "Document",
        "Deadline",
        "Time Remaining (D:HH:MM:SS)",
    ]);
    for tender in tenders {
        table.push(vec![
            format_date(&tender.date_submitted, offset),
            tender.name.clone(),
            format!("{} <{}>", tender.document_name, tender.document_url),
            format_date_time(&tender.deadline, offset),
            countdown_for(tender, now)
                .map(|c| c.digital_label())
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
        ]);
    }
    out.push_str(&table.render("No submitted tenders yet."));
    out
}

pub fn render_requests(
    requests: &[RequirementSubmission],
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} Requests)", Tab::Requests.title(), requests.len());
    let _ = writeln!(out);

    let mut table = TextTable::new(&[
        "Received",
        "Tender / RFP Name",
        "Deadline",
        "Time Remaining",
        "Files",
        "Description",
    ]);
    for request in requests {
        let received = request
            .created_at
            .as_deref()
            .map(|c| format_date_time(c, offset))
            .unwrap_or_else(|| NO_COUNTDOWN.to_string());
        let files = request
            .files
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.push(vec![
            received,
            request.tender_name.clone(),
            format_date(&request.deadline, offset),
            countdown_for(request, now)
                .map(|c| c.label)
                .unwrap_or_else(|| NO_COUNTDOWN.to_string()),
            files,
            request.description.clone(),
        ]);
    }
    out.push_str(&table.render("No new requests found."));
    out
}

pub fn render_detail(tender: &Tender, offset: &FixedOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tender.name);
    let _ = writeln!(out, "{}", "=".repeat(tender.name.chars().count().max(8)));
    let _ = writeln!(
        out,
        "Date Submitted to Us: {}",
        format_date(&tender.date_submitted, offset)
    );
    let _ = writeln!(
        out,
        "Deadline:             {}",
        format_date_time(&tender.deadline, offset)
    );
    match &tender.our_submission_date {
        Some(date) => {
            let early = days_early(tender)
                .map(|d| format!(" ({} days before deadline)", d))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "Our Submission Date:  {}{}",
                format_date_time(date, offset),
                early
            );
        }
        None => {
            let _ = writeln!(out, "Our Submission Date:  Not yet submitted");
        }
    }
    let _ = writeln!(
        out,
        "Quoted Amount:        {}",
        format_amount(tender.quoted_amount)
    );
    let _ = writeln!(out, "Status:               {}", status_badge(tender));
    let _ = writeln!(out);
    let _ = writeln!(out, "Description");
    let _ = writeln!(out, "  {}", tender.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "Requirements");
    let _ = writeln!(out, "  {}", tender.requirements);
    out
}

/// Tier counts over the tender list, for the watch header.
pub fn tier_summary(tenders: &[Tender], now: DateTime<Utc>) -> Vec<(Tier, usize)> {
    let mut counts = [
        (Tier::Urgent, 0usize),
        (Tier::Warning, 0),
        (Tier::Normal, 0),
        (Tier::Expired, 0),
    ];
    for countdown in tenders.iter().filter_map(|t| countdown_for(t, now)) {
        if let Some(entry) = counts.iter_mut().find(|(tier, _)| *tier == countdown.tier) {
            entry.1 += 1;
        }
    }
    counts.to_vec()
}

struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, empty_message: &str) -> String {
        if self.rows.is_empty() {
            return format!("{}\n", empty_message);
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        write_row(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &self.rows {
            write_row(&mut out, row, &widths);
        }
        out
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
