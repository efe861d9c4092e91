use crate::domain::model::ContactEmail;
use crate::domain::ports::ContactNotifier;
use crate::utils::error::{PortalError, Result};

pub const SUBJECT_PREFIX: &str = "[DCS Portal Inquiry]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSettings {
    pub sender_name: String,
    pub sender_email: String,
    pub recipient: String,
}

pub struct ContactService<N: ContactNotifier> {
    notifier: N,
    settings: ContactSettings,
}

impl<N: ContactNotifier> ContactService<N> {
    pub fn new(notifier: N, settings: ContactSettings) -> Self {
        Self { notifier, settings }
    }

    pub fn compose(&self, subject: &str, message: &str) -> Result<ContactEmail> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(PortalError::validation("subject", "Subject is required"));
        }
        if message.trim().is_empty() {
            return Err(PortalError::validation("message", "Message is required"));
        }

        let html = format!(
            concat!(
                "<div style=\"font-family: sans-serif; padding: 20px; border: 1px solid #eee; border-radius: 5px;\">",
                "<h2 style=\"color: #333;\">New Contact Message</h2>",
                "<p><strong>Subject:</strong> {subject}</p>",
                "<hr style=\"border: 0; border-top: 1px solid #eee; margin: 20px 0;\" />",
                "<p><strong>Message:</strong></p>",
                "<div style=\"background: #f9f9f9; padding: 15px; border-radius: 5px; color: #555;\">{body}</div>",
                "</div>"
            ),
            subject = escape_html(subject),
            body = escape_html(message).replace('\n', "<br>"),
        );

        Ok(ContactEmail {
            from: format!(
                "\"{}\" <{}>",
                self.settings.sender_name, self.settings.sender_email
            ),
            to: self.settings.recipient.clone(),
            subject: format!("{} {}", SUBJECT_PREFIX, subject),
            text: message.to_string(),
            html,
        })
    }

    pub async fn send(&self, subject: &str, message: &str) -> Result<ContactEmail> {
        let email = self.compose(subject, message)?;
        self.notifier.send(&email).await?;
        tracing::info!("📨 Contact message '{}' sent", email.subject);
        Ok(email)
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ContactEmail>>,
    }

    #[async_trait]
    impl ContactNotifier for RecordingNotifier {
        async fn send(&self, email: &ContactEmail) -> Result<()> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn settings() -> ContactSettings {
        ContactSettings {
            sender_name: "DCS Portal".to_string(),
            sender_email: "portal@dcs.example".to_string(),
            recipient: "team@dcs.example".to_string(),
        }
    }

    #[test]
    fn message_is_escaped_and_prefixed() {
        let service = ContactService::new(RecordingNotifier::default(), settings());
        let email = service
            .compose("Site visit", "Line one\n<b>Line two</b>")
            .unwrap();

        assert_eq!(email.subject, "[DCS Portal Inquiry] Site visit");
        assert_eq!(email.from, "\"DCS Portal\" <portal@dcs.example>");
        assert_eq!(email.to, "team@dcs.example");
        assert!(email.html.contains("Line one<br>&lt;b&gt;Line two&lt;/b&gt;"));
        assert_eq!(email.text, "Line one\n<b>Line two</b>");
    }

    #[test]
    fn empty_fields_are_rejected() {
        let service = ContactService::new(RecordingNotifier::default(), settings());
        assert!(service.compose("  ", "hello").is_err());
        assert!(service.compose("Hello", "\n").is_err());
    }

    #[tokio::test]
    async fn send_hands_email_to_notifier() {
        let service = ContactService::new(RecordingNotifier::default(), settings());
        service.send("Pricing", "Can we talk?").await.unwrap();

        let sent = service.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[DCS Portal Inquiry] Pricing");
    }
}
