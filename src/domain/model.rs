use crate::utils::error::Result;
use crate::utils::validation::validate_required_fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A prospective customer's inquiry, as posted to the lead endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Lead {
    /// Builds a lead from submitted form data after checking `required` fields.
    /// Values are kept exactly as entered.
    pub fn from_form_data(mut data: BTreeMap<String, String>, required: &[String]) -> Result<Self> {
        validate_required_fields(&data, required)?;

        Ok(Self {
            name: data.remove("name").unwrap_or_default(),
            email: data.remove("email").unwrap_or_default(),
            message: data.remove("message").unwrap_or_default(),
            extra: data,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }
}

/// Lifecycle of the contact form. `Failed` falls back to `Idle` once the UI is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Validation failed; nothing was sent.
    Rejected { missing: Vec<String> },
    Succeeded { name: String },
    Failed { reason: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}
