use async_trait::async_trait;
use hostelbyte_config::EmailConfig;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument, warn};

use super::notifier::{NotifyError, Notifier};

const WELCOME_SUBJECT: &str = "Your New Hostel Account Details";

/// SMTP-backed [`Notifier`].
///
/// With SMTP disabled every delivery fails: a student whose temporary
/// password cannot be sent must not be created.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), NotifyError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| NotifyError::DeliveryFailed(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| NotifyError::DeliveryFailed(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| NotifyError::DeliveryFailed(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    NotifyError::DeliveryFailed(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| NotifyError::DeliveryFailed(format!("Task join error: {}", e)))?
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    #[instrument(skip(self, temp_password))]
    async fn send_welcome(
        &self,
        recipient: &str,
        name: &str,
        roll_no: &str,
        temp_password: &str,
    ) -> Result<(), NotifyError> {
        if !self.config.enabled {
            warn!(recipient, roll_no, "SMTP disabled, welcome email not sent");
            return Err(NotifyError::DeliveryFailed("SMTP is disabled".to_string()));
        }

        let text_body = welcome_text(name, roll_no, temp_password, &self.config.from_name);
        let html_body = welcome_html(name, roll_no, temp_password, &self.config.from_name);
        self.send_email(recipient, WELCOME_SUBJECT, &text_body, &html_body)
            .await?;

        info!(recipient, "Welcome email sent");
        Ok(())
    }
}

fn welcome_text(name: &str, roll_no: &str, temp_password: &str, signature: &str) -> String {
    format!(
        "Hello {},\n\n\
         An account has been created for you in the hostel management portal.\n\n\
         Log in with the credentials below. You can change your password from \
         your profile after the first login.\n\n\
         Username (Roll No): {}\n\
         Temporary Password: {}\n\n\
         Thank you,\n\
         {}",
        name, roll_no, temp_password, signature
    )
}

fn welcome_html(name: &str, roll_no: &str, temp_password: &str, signature: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{subject}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" style="margin: 0 auto; background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="padding: 30px; color: #333333; font-size: 15px; line-height: 1.6;">
                <p>Hello {name},</p>
                <p>An account has been created for you in the hostel management portal.</p>
                <p>Log in with the credentials below. You can change your password from your profile after the first login.</p>
                <ul>
                    <li><strong>Username (Roll No):</strong> {roll_no}</li>
                    <li><strong>Temporary Password:</strong> {temp_password}</li>
                </ul>
                <p>Thank you,<br>{signature}</p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        subject = WELCOME_SUBJECT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@hostelbyte.local".to_string(),
            from_name: "Hostel Administration".to_string(),
        }
    }

    #[test]
    fn test_welcome_bodies_carry_credentials() {
        let text = welcome_text("Asha", "CS-001", "a1b2c3d4e5", "Hostel Administration");
        assert!(text.contains("Username (Roll No): CS-001"));
        assert!(text.contains("Temporary Password: a1b2c3d4e5"));

        let html = welcome_html("Asha", "CS-001", "a1b2c3d4e5", "Hostel Administration");
        assert!(html.contains("Hello Asha,"));
        assert!(html.contains("a1b2c3d4e5"));
        assert!(html.contains(WELCOME_SUBJECT));
    }

    #[tokio::test]
    async fn test_disabled_service_reports_delivery_failure() {
        let service = EmailService::new(disabled_config());
        let err = service
            .send_welcome("asha@college.test", "Asha", "CS-001", "a1b2c3d4e5")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to send welcome email: SMTP is disabled"
        );
    }
}
