use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::page::error::PageError;

/// Shared flag the controller flips when a newer submission supersedes this one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything needed to post one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub form_id: String,
    pub action: String,
    pub fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

/// JSON body the request endpoints answer with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default)]
    pub request_number: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmissionResponse {
    pub fn accepted(request_number: &str) -> Self {
        Self {
            success: true,
            request_number: Some(request_number.to_string()),
            ..Self::default()
        }
    }

    pub fn rejected(error: &str) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Server-provided explanation, `error` taking precedence over `message`.
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// `success: false` becomes [`PageError::Application`] carrying the
    /// server's reason (empty when none was given).
    pub fn into_verdict(self) -> Result<Self, PageError> {
        if self.success {
            Ok(self)
        } else {
            let reason = self.reason().unwrap_or_default().to_string();
            Err(PageError::Application(reason))
        }
    }
}

/// Outcome of one submit attempt, consumed by the dialog step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success { request_number: String },
    Failure { message: String },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    /// Collapse a transport outcome into what the visitor sees.
    pub fn from_outcome(
        outcome: Result<SubmissionResponse, PageError>,
        placeholder: &str,
        fallback: &str,
    ) -> Self {
        match outcome {
            Ok(response) if response.success => SubmissionResult::Success {
                request_number: response
                    .request_number
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| placeholder.to_string()),
            },
            Ok(response) => SubmissionResult::Failure {
                message: response.reason().unwrap_or(fallback).to_string(),
            },
            Err(PageError::Application(reason)) if !reason.trim().is_empty() => {
                SubmissionResult::Failure { message: reason }
            }
            Err(_) => SubmissionResult::Failure {
                message: fallback.to_string(),
            },
        }
    }
}

/// Sends a prepared submission somewhere and reads back the JSON verdict.
pub trait Transport {
    fn send(
        &self,
        request: &SubmissionRequest,
        cancel: &CancelToken,
    ) -> Result<SubmissionResponse, PageError>;
}

/// Posts url-encoded form data with the XHR marker and CSRF headers.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    /// `timeout: None` leaves the request unbounded.
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self, PageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PageError::Config(format!("HTTP client: {}", e)))?;

        let base_url = base_url
            .map(|b| {
                Url::parse(b).map_err(|e| PageError::Config(format!("base_url '{}': {}", b, e)))
            })
            .transpose()?;

        Ok(Self { client, base_url })
    }

    pub fn resolve(&self, action: &str) -> Result<Url, PageError> {
        let parsed = match &self.base_url {
            Some(base) => base.join(action),
            None => Url::parse(action),
        };
        parsed.map_err(|e| PageError::Config(format!("form action '{}': {}", action, e)))
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &SubmissionRequest,
        cancel: &CancelToken,
    ) -> Result<SubmissionResponse, PageError> {
        if cancel.is_cancelled() {
            return Err(PageError::Cancelled);
        }

        let url = self.resolve(&request.action)?;
        let endpoint = url.to_string();
        debug!(form = %request.form_id, %endpoint, fields = request.fields.len(), "posting form");

        let mut builder = self
            .client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&request.fields);
        if let Some(token) = &request.csrf_token {
            builder = builder.header("X-CSRFToken", token);
        }

        let response = builder.send().map_err(|e| PageError::Transport {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        if cancel.is_cancelled() {
            return Err(PageError::Cancelled);
        }

        let status = response.status();
        let body = response.text().map_err(|e| PageError::Transport {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        match serde_json::from_str::<SubmissionResponse>(&body) {
            Ok(mut parsed) => {
                if !status.is_success() {
                    warn!(
                        %endpoint,
                        status = status.as_u16(),
                        "submission answered with error status"
                    );
                    parsed.success = false;
                }
                Ok(parsed)
            }
            Err(_) if !status.is_success() => Err(PageError::Http {
                endpoint,
                status: status.as_u16(),
            }),
            Err(e) => Err(PageError::JsonParse {
                context: format!("response from {}", endpoint),
                source: e,
            }),
        }
    }
}
