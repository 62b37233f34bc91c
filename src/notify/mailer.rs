use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<EmailAttachment>,
}

/// Outbound mail transport. `Log` is the dev default, `Memory` records sends
/// for tests and can be told to fail.
#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Log,
    Memory(MemoryOutbox),
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.mail_mode.as_str() {
            "smtp" => Self::smtp(config),
            _ => Ok(Mailer::Log),
        }
    }

    pub fn smtp(config: &Config) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|err| AppError::Internal(format!("invalid smtp relay: {err}")))?
            .port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|err| AppError::Internal(format!("invalid SMTP_FROM address: {err}")))?;

        Ok(Mailer::Smtp {
            transport: builder.build(),
            from,
        })
    }

    pub async fn send(&self, mail: OutboundEmail) -> Result<(), AppError> {
        match self {
            Mailer::Log => {
                info!(
                    to = %mail.to,
                    subject = %mail.subject,
                    attachment = mail.attachment.is_some(),
                    "mail transport in log mode; not sending"
                );
                Ok(())
            }
            Mailer::Memory(outbox) => outbox.record(mail),
            Mailer::Smtp { transport, from } => {
                let to = mail
                    .to
                    .parse::<Mailbox>()
                    .map_err(|err| AppError::Internal(format!("invalid recipient: {err}")))?;

                let builder = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(mail.subject.clone());

                let message = match &mail.attachment {
                    Some(att) => {
                        let content_type = att.content_type.parse::<ContentType>().map_err(
                            |err| AppError::Internal(format!("invalid content type: {err}")),
                        )?;
                        builder
                            .multipart(
                                MultiPart::mixed()
                                    .singlepart(SinglePart::plain(mail.body.clone()))
                                    .singlepart(
                                        Attachment::new(att.filename.clone())
                                            .body(att.bytes.clone(), content_type),
                                    ),
                            )
                            .map_err(|err| {
                                AppError::Internal(format!("failed to build mail: {err}"))
                            })?
                    }
                    None => builder
                        .header(ContentType::TEXT_PLAIN)
                        .body(mail.body.clone())
                        .map_err(|err| {
                            AppError::Internal(format!("failed to build mail: {err}"))
                        })?,
                };

                transport
                    .send(message)
                    .await
                    .map(|_| ())
                    .map_err(|err| AppError::Internal(format!("smtp send failed: {err}")))
            }
        }
    }
}

/// Records every send in memory. Flip `fail_all` to exercise the
/// best-effort paths.
#[derive(Clone, Default)]
pub struct MemoryOutbox {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    fail_all: Arc<AtomicBool>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("outbox lock").clone()
    }

    fn record(&self, mail: OutboundEmail) -> Result<(), AppError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "memory mail transport configured to fail".to_string(),
            ));
        }
        self.sent.lock().expect("outbox lock").push(mail);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryOutbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryOutbox")
            .field("sent", &self.sent.lock().expect("outbox lock").len())
            .finish()
    }
}
