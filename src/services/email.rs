//! Email notifications for contact form messages

use crate::config::SmtpConfig;
use crate::models::ContactMessage;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Port on which the relay expects STARTTLS instead of implicit TLS
const STARTTLS_PORT: u16 = 587;

/// Something told about every new contact message
#[async_trait]
pub trait ContactNotifier: Send + Sync {
    async fn notify(&self, message: &ContactMessage) -> Result<()>;
}

/// SMTP notifier; a no-op while SMTP credentials are missing
pub struct EmailService {
    config: SmtpConfig,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if self.config.port == STARTTLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
        }
        .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());
        Ok(builder.credentials(creds).port(self.config.port).build())
    }
}

#[async_trait]
impl ContactNotifier for EmailService {
    async fn notify(&self, message: &ContactMessage) -> Result<()> {
        if !self.is_enabled() {
            tracing::debug!("SMTP not configured, skipping notification for message {}", message.id);
            return Ok(());
        }

        let (subject, body) = compose_notification(message);
        let email = Message::builder()
            .from(
                self.config
                    .username
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(self
                .config
                .contact_email
                .parse()
                .map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        self.transport()?
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!("Sent notification for contact message {}", message.id);
        Ok(())
    }
}

/// Subject and plain-text body of the notification email
pub fn compose_notification(message: &ContactMessage) -> (String, String) {
    let subject = message.subject.as_deref().unwrap_or("Без темы");
    (
        format!("Новое сообщение: {}", subject),
        format!(
            "Новое сообщение с сайта ФСП Чувашии\n\n\
             Имя: {}\nEmail: {}\nТема: {}\n\n\
             Сообщение:\n{}",
            message.name, message.email, subject, message.message
        ),
    )
}
