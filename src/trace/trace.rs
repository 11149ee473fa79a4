use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::controller::FormState;

/// One controller transition, written as a JSONL line.
#[derive(Debug, Serialize)]
pub struct FormTraceEvent {
    pub timestamp_ms: u128,
    pub form_id: String,
    pub generation: u64,

    pub from: String,
    pub to: String,

    pub outcome: Option<String>,
    pub detail: Option<String>,

    /// SHA-1 of the phone value; the number itself never reaches the trace.
    pub phone_fingerprint: Option<String>,
}

impl FormTraceEvent {
    pub fn now(form_id: &str, generation: u64, from: FormState, to: FormState) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            form_id: form_id.to_string(),
            generation,
            from: format!("{:?}", from),
            to: format!("{:?}", to),
            outcome: None,
            detail: None,
            phone_fingerprint: None,
        }
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        if !phone.is_empty() {
            self.phone_fingerprint = Some(text_fingerprint(phone));
        }
        self
    }
}

pub fn text_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
