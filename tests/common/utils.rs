use std::cell::RefCell;
use std::sync::Arc;

use lead_forms::{
    Page,
    form::{
        binding::FormConfig,
        controller::Messages,
        submission::{CancelToken, SubmissionRequest, SubmissionResponse, Transport},
    },
    page::error::PageError,
    phone::formatter::PhoneRule,
    trace::logger::TraceLogger,
};

pub const CSRF: &str = "tok123";
pub const ACTION: &str = "http://127.0.0.1:9/requests/consultation/";

pub fn consultation_config() -> FormConfig {
    FormConfig::new("consultationForm")
        .with_phone("phone", "phoneError")
        .with_action(ACTION)
}

pub fn page_with(forms: &[FormConfig]) -> Page {
    Page::scaffold(
        forms,
        &Messages::default(),
        PhoneRule::Strict,
        Some(CSRF),
        Arc::new(TraceLogger::disabled()),
    )
}

pub fn consultation_page() -> Page {
    page_with(&[consultation_config()])
}

/// What the scripted transport does on every send.
pub enum Reply {
    Respond(SubmissionResponse),
    NetworkDown,
    Malformed,
    Status(u16),
}

/// Transport double that records requests and answers from a script.
pub struct ScriptedTransport {
    reply: Reply,
    pub requests: RefCell<Vec<SubmissionRequest>>,
}

impl ScriptedTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn accepting(request_number: &str) -> Self {
        Self::new(Reply::Respond(SubmissionResponse::accepted(request_number)))
    }

    pub fn sent(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last(&self) -> SubmissionRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &SubmissionRequest,
        _cancel: &CancelToken,
    ) -> Result<SubmissionResponse, PageError> {
        self.requests.borrow_mut().push(request.clone());
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::NetworkDown => Err(PageError::Transport {
                endpoint: request.action.clone(),
                message: "connection refused".into(),
            }),
            Reply::Malformed => Err(PageError::JsonParse {
                context: "scripted".into(),
                source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            }),
            Reply::Status(status) => Err(PageError::Http {
                endpoint: request.action.clone(),
                status: *status,
            }),
        }
    }
}

pub fn field<'a>(request: &'a SubmissionRequest, name: &str) -> Option<&'a str> {
    request
        .fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}
