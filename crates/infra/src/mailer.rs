//! Outbound mail port.

use async_trait::async_trait;
use tracing::info;

use farmstand_core::DomainResult;

/// Port for outbound mail: login codes and broadcast messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()>;
}

/// Mailer that writes the message to the log instead of sending it.
/// Used in dev and test; the login code shows up in the server log.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        info!(to, subject, body, "outbound mail");
        Ok(())
    }
}
