use crate::config::SiteConfig;
use crate::domain::model::Lead;
use crate::domain::ports::LeadGateway;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Posts leads as JSON to the site's lead endpoint.
#[derive(Debug, Clone)]
pub struct HttpLeadGateway {
    client: Client,
    endpoint: String,
}

impl HttpLeadGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.contact_form.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.lead_endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadGateway for HttpLeadGateway {
    async fn submit(&self, lead: &Lead) -> Result<()> {
        tracing::debug!("Posting lead to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(lead)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Lead endpoint response status: {}", status);

        if status.is_success() {
            Ok(())
        } else {
            Err(SiteError::SubmissionRejected {
                status: status.as_u16(),
            })
        }
    }
}
