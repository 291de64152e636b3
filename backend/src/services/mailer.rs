//! Renders and relays the contact-form thank-you notification through the
//! Resend transactional email API. One attempt, no retries: a provider
//! failure surfaces directly as a 502 to the submitter.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::utils::sanitize::escape_html;

/// Provider error bodies are passed through to the client for debugging,
/// capped so a misbehaving upstream cannot flood the response.
const PROVIDER_DETAIL_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub service: String,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

pub struct ContactMailer {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    from: String,
    reply_to: String,
    site_name: String,
}

impl ContactMailer {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        from: String,
        reply_to: String,
        site_name: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
            from,
            reply_to,
            site_name,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.resend_api_base.clone(),
            config.resend_api_key.clone(),
            config.resend_from.clone(),
            config.resend_reply_to.clone(),
            config.site_name.clone(),
        )
    }

    /// Sends the confirmation to the person who submitted the form.
    pub async fn send_thank_you(&self, submission: &ContactSubmission) -> Result<(), AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::MissingEmailApiKey);
        };

        let payload = json!({
            "from": self.from,
            "to": [submission.email],
            "subject": format!("Thanks for reaching out to {}!", self.site_name),
            "html": self.render_html(submission),
            "text": self.render_text(submission),
            "reply_to": self.reply_to,
        });

        let response = self
            .http
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AppError::EmailProvider {
                detail: truncate_detail(&err.to_string()),
            })?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::EmailProvider {
                detail: truncate_detail(&detail),
            });
        }

        Ok(())
    }

    fn render_html(&self, s: &ContactSubmission) -> String {
        let first_name = escape_html(&s.first_name);
        let last_name = escape_html(&s.last_name);
        let email = escape_html(&s.email);
        let service = escape_html(&s.service);
        let message_block = s
            .message
            .as_deref()
            .map(|m| {
                format!(
                    "<p style=\"margin-top:12px;white-space:pre-wrap;color:#D1D1D6\">\
                     <strong>Message:</strong><br>{}</p>",
                    escape_html(m)
                )
            })
            .unwrap_or_default();
        let submitted = s.submitted_at.format("%B %-d, %Y at %H:%M UTC");

        format!(
            "<!doctype html><html><body style=\"background:#0B0B0C;padding:24px\">\
             <div style=\"max-width:600px;margin:0 auto;background:#0B0B0C;color:#E6E6EA;\
             border:1px solid #2D2E33;border-radius:16px;padding:32px;\
             font-family:system-ui,-apple-system,'Segoe UI',Roboto,Helvetica,Arial,sans-serif\">\
             <h1 style=\"margin:0;font-size:28px;line-height:1.2;color:#f97316\">\
             Thanks for reaching out!</h1>\
             <p style=\"margin-top:16px;font-size:16px;line-height:1.6\">\
             Hey <strong>{first_name}</strong>,</p>\
             <p style=\"margin-top:8px;font-size:16px;line-height:1.6\">\
             We received your inquiry and we'll get back to you within \
             <strong>24-48 hours</strong>. In the meantime, feel free to explore our \
             work and services.</p>\
             <div style=\"margin-top:24px;background:#16161A;border:1px solid #2D2E33;\
             border-radius:12px;padding:20px\">\
             <h3 style=\"margin:0;font-size:14px;color:#A3A3AD;text-transform:uppercase;\
             letter-spacing:1px\">Your Submission</h3>\
             <p style=\"margin:12px 0 4px\"><strong>Name:</strong> {first_name} {last_name}</p>\
             <p style=\"margin:4px 0\"><strong>Email:</strong> {email}</p>\
             <p style=\"margin:4px 0\"><strong>Service:</strong> {service}</p>\
             {message_block}\
             <p style=\"margin-top:12px;font-size:13px;color:#6B6B75\">Submitted on {submitted}</p>\
             </div>\
             <hr style=\"margin-top:24px;border:none;border-top:1px solid #2D2E33\">\
             <p style=\"margin-top:16px;font-size:14px;color:#A3A3AD\">\
             Questions? Just reply to this email.</p>\
             <p style=\"margin-top:8px;font-size:14px\">&mdash; {site_name}</p>\
             </div></body></html>",
            site_name = escape_html(&self.site_name),
        )
    }

    fn render_text(&self, s: &ContactSubmission) -> String {
        let message_line = s
            .message
            .as_deref()
            .map(|m| format!("Message: {}\n", m))
            .unwrap_or_default();
        format!(
            "Hey {first},\n\n\
             Thanks for reaching out to {site}! We received your inquiry and we'll \
             get back to you within 24-48 hours.\n\n\
             Your Submission:\n\
             Name: {first} {last}\n\
             Email: {email}\n\
             Service: {service}\n\
             {message_line}\n\
             Submitted: {submitted}\n\n\
             Questions? Just reply to this email.\n\n\
             \u{2014} {site}",
            first = s.first_name,
            last = s.last_name,
            email = s.email,
            service = s.service,
            site = self.site_name,
            submitted = s.submitted_at.format("%B %-d, %Y at %H:%M UTC"),
        )
    }
}

fn truncate_detail(detail: &str) -> String {
    detail.chars().take(PROVIDER_DETAIL_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mailer() -> ContactMailer {
        ContactMailer::new(
            "https://api.resend.com".to_string(),
            Some("re_test_key".to_string()),
            "ACME Studios <no-reply@acme-studios.org>".to_string(),
            "hello@acme-studios.org".to_string(),
            "ACME Studios".to_string(),
        )
    }

    fn submission(message: Option<&str>) -> ContactSubmission {
        ContactSubmission {
            first_name: "Ava".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ava@x.com".to_string(),
            service: "Web Design".to_string(),
            message: message.map(str::to_string),
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn html_rendering_escapes_user_text() {
        let mut s = submission(Some("<b>bold</b> & more"));
        s.first_name = "<Ava>".to_string();
        let html = mailer().render_html(&s);
        assert!(html.contains("&lt;Ava&gt;"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; more"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn html_omits_message_block_when_absent() {
        let html = mailer().render_html(&submission(None));
        assert!(!html.contains("Message:"));
        assert!(html.contains("Your Submission"));
    }

    #[test]
    fn text_rendering_lists_submission_fields() {
        let text = mailer().render_text(&submission(Some("Tell me more")));
        assert!(text.starts_with("Hey Ava,"));
        assert!(text.contains("Name: Ava Lovelace"));
        assert!(text.contains("Service: Web Design"));
        assert!(text.contains("Message: Tell me more"));
        assert!(text.contains("Submitted: June 1, 2025 at 12:30 UTC"));
    }

    #[test]
    fn detail_truncation_caps_long_provider_bodies() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_detail(&long).len(), PROVIDER_DETAIL_LIMIT);
        assert_eq!(truncate_detail("short"), "short");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        let mailer = ContactMailer::new(
            "https://api.resend.com".to_string(),
            None,
            "from".to_string(),
            "reply".to_string(),
            "Site".to_string(),
        );
        let err = mailer.send_thank_you(&submission(None)).await.unwrap_err();
        assert!(matches!(err, AppError::MissingEmailApiKey));
    }
}
