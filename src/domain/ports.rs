use crate::domain::model::Lead;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where submitted leads go. Success means the backend answered with a 2xx status.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    async fn submit(&self, lead: &Lead) -> Result<()>;
}

/// Blocking user-facing notifications (`window.alert` in a browser).
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}
