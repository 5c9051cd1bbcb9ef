//! Photo flag reporting.
//!
//! A report is recorded locally first, then forwarded to the static
//! host's form-capture endpoint as a urlencoded POST. The local flag
//! is the source of truth; a failed forward leaves it in place with
//! `submitted` still false so the admin review queue sees it either
//! way.

use crate::error::AppError;
use photo_metadata::FlagStore;
use std::collections::HashMap;

/// Form name registered with the form-capture backend
const FLAG_FORM_NAME: &str = "photo-flag-report";

/// One resident-submitted report
#[derive(Debug, Clone)]
pub struct FlagReport {
    pub photo_id: String,
    pub event_id: String,
    pub photo_url: String,
    pub event_title: String,
    pub reason: String,
    pub apartment: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_name: Option<String>,
}

/// Lifecycle of one report submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    /// Recorded locally and forwarded
    Success,
    /// Recorded locally but the forward failed
    Error,
}

/// Records reports in the flag store and forwards them to the
/// form-capture endpoint.
pub struct FlagReporter {
    client: reqwest::Client,
    /// Site origin the form POST targets, e.g. `https://archive.solhem.com`
    form_endpoint: String,
}

impl FlagReporter {
    pub fn new(form_endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            form_endpoint: form_endpoint.into(),
        }
    }

    /// Submit a report: flag locally, then forward. The returned status
    /// is `Success` only when both steps went through; a transport or
    /// non-2xx failure yields `Error` with the local flag untouched.
    pub async fn submit(
        &self,
        report: &FlagReport,
        flags: &FlagStore,
    ) -> Result<SubmitStatus, AppError> {
        flags
            .flag_photo(
                &report.photo_id,
                &report.event_id,
                &report.reason,
                report.reporter_email.clone(),
                report.reporter_name.clone(),
            )
            .await?;

        match self.forward(report).await {
            Ok(()) => {
                flags.mark_submitted(&report.photo_id).await?;
                Ok(SubmitStatus::Success)
            }
            Err(e) => {
                log::warn!(
                    "Flag forward failed for {} ({}), report kept locally",
                    report.photo_id,
                    e
                );
                Ok(SubmitStatus::Error)
            }
        }
    }

    async fn forward(&self, report: &FlagReport) -> Result<(), AppError> {
        let mut form: HashMap<&str, &str> = HashMap::new();
        form.insert("form-name", FLAG_FORM_NAME);
        form.insert("photo-id", &report.photo_id);
        form.insert("event-id", &report.event_id);
        form.insert("photo-url", &report.photo_url);
        form.insert("event-title", &report.event_title);
        form.insert("reason", &report.reason);
        if let Some(apartment) = &report.apartment {
            form.insert("apartment", apartment);
        }
        if let Some(email) = &report.reporter_email {
            form.insert("email", email);
        }
        if let Some(name) = &report.reporter_name {
            form.insert("name", name);
        }

        let response = self
            .client
            .post(&self.form_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("form submission failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Http(format!(
                "form capture returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
