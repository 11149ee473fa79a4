use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    dialog::presenter::DialogPresenter,
    form::{
        binding::{CSRF_FIELD, FormBinding, FormConfig},
        submission::{
            CancelToken, SubmissionRequest, SubmissionResponse, SubmissionResult, Transport,
        },
    },
    page::{
        document::{Document, HIDDEN_CLASS},
        error::PageError,
    },
    phone::formatter::{self, PhoneRule},
    trace::{logger::TraceLogger, trace::FormTraceEvent},
};

const INVALID_CLASS: &str = "is-invalid";

/// Visitor-facing strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default = "default_validation")]
    pub validation: String,
    #[serde(default = "default_fallback_error")]
    pub fallback_error: String,
    #[serde(default = "default_busy_label")]
    pub busy_label: String,
    #[serde(default = "default_idle_label")]
    pub idle_label: String,
    #[serde(default = "default_placeholder")]
    pub request_number_placeholder: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            validation: default_validation(),
            fallback_error: default_fallback_error(),
            busy_label: default_busy_label(),
            idle_label: default_idle_label(),
            request_number_placeholder: default_placeholder(),
        }
    }
}

fn default_validation() -> String {
    "Введите номер в формате: +7 (XXX) XXX-XX-XX".to_string()
}

fn default_fallback_error() -> String {
    "Произошла ошибка при отправке формы. Пожалуйста, попробуйте позже.".to_string()
}

fn default_busy_label() -> String {
    "Отправка...".to_string()
}

fn default_idle_label() -> String {
    "Оставить заявку".to_string()
}

fn default_placeholder() -> String {
    "12345".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failure,
}

/// A submission that has left the controller and awaits its verdict.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub generation: u64,
    pub request: SubmissionRequest,
    pub cancel: CancelToken,
}

#[derive(Debug)]
pub enum SubmitStart {
    Started(PendingSubmission),
    /// Phone check failed; the inline error is showing.
    Blocked { message: String },
    /// Submit control is disabled.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Presented(SubmissionResult),
    /// The ticket was cancelled or superseded; nothing on the page changed.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Blocked { message: String },
    Ignored,
    Presented(SubmissionResult),
    Stale,
}

/// Drives one form through `Idle -> Validating -> Submitting -> Success|Failure -> Idle`.
///
/// Network work happens outside: [`begin_submit`](Self::begin_submit) hands
/// out a [`PendingSubmission`] and [`complete`](Self::complete) takes the
/// transport's answer back. Every error is absorbed into the failure dialog.
pub struct FormSubmissionController {
    binding: FormBinding,
    messages: Messages,
    rule: PhoneRule,
    idle_label: String,
    state: FormState,
    generation: u64,
    in_flight: Option<CancelToken>,
    tracer: Arc<TraceLogger>,
}

impl FormSubmissionController {
    /// Bind to the form on `doc` and register the form reset on both dialogs.
    pub fn attach(
        doc: &Document,
        presenter: &mut DialogPresenter,
        config: &FormConfig,
        messages: Messages,
        rule: PhoneRule,
        tracer: Arc<TraceLogger>,
    ) -> Result<Self, PageError> {
        let binding = config.resolve();
        binding.verify(doc)?;

        let idle_label = doc
            .text_of(&binding.label_id)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| messages.idle_label.clone());

        for dialog in [&binding.success_dialog_id, &binding.error_dialog_id] {
            let form_id = binding.form_id.clone();
            presenter.on_closed(
                dialog,
                Box::new(move |doc: &mut Document| doc.reset_form(&form_id)),
            );
        }

        debug!(form = %binding.form_id, phone = binding.phone.is_some(), "form attached");

        Ok(Self {
            binding,
            messages,
            rule,
            idle_label,
            state: FormState::Idle,
            generation: 0,
            in_flight: None,
            tracer,
        })
    }

    pub fn form_id(&self) -> &str {
        &self.binding.form_id
    }

    pub fn binding(&self) -> &FormBinding {
        &self.binding
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `input` listener: reformat the phone field in place and refresh the inline error.
    pub fn on_phone_input(&self, doc: &mut Document, raw: &str) -> String {
        let formatted = formatter::format(raw);
        let Some(phone) = &self.binding.phone else {
            return formatted;
        };

        if let Some(input) = doc.get_mut(&phone.input_id) {
            input.value = formatted.clone();
        }
        // An emptied field stays unflagged until submit.
        if formatted.is_empty() || self.rule.accepts(&formatted) {
            self.clear_phone_error(doc);
        } else {
            self.show_phone_error(doc);
        }
        formatted
    }

    /// Paste goes through the same path after digit clean-up.
    pub fn on_phone_paste(&self, doc: &mut Document, pasted: &str) -> String {
        self.on_phone_input(doc, &formatter::normalize_paste(pasted))
    }

    /// Click on the submit control. A disabled control swallows the click.
    pub fn click_submit(&mut self, doc: &mut Document) -> SubmitStart {
        let disabled = doc
            .get(&self.binding.submit_control_id)
            .is_some_and(|c| c.disabled);
        if disabled {
            debug!(form = %self.binding.form_id, "click on disabled submit control ignored");
            return SubmitStart::Ignored;
        }
        self.begin_submit(doc)
    }

    /// Form `submit` event. Browser submission never happens; either a
    /// ticket comes back or the attempt is blocked inline.
    ///
    /// A submit arriving while another is outstanding cancels the older
    /// ticket once the new one passes validation.
    pub fn begin_submit(&mut self, doc: &mut Document) -> SubmitStart {
        let resume = self.state;
        self.enter(FormState::Validating, None);

        if let Some(phone) = &self.binding.phone {
            let value = doc.value_of(&phone.input_id).unwrap_or_default().to_string();
            if !self.rule.accepts(&value) {
                self.show_phone_error(doc);
                let back = if resume == FormState::Submitting {
                    FormState::Submitting
                } else {
                    FormState::Idle
                };
                let error = PageError::Validation(self.messages.validation.clone());
                let form_id = &self.binding.form_id;
                self.log(
                    FormTraceEvent::now(form_id, self.generation, FormState::Validating, back)
                        .with_outcome("blocked")
                        .with_detail(&error)
                        .with_phone(&value),
                );
                info!(form = %form_id, "submission blocked: {}", error);
                self.state = back;
                return SubmitStart::Blocked {
                    message: self.messages.validation.clone(),
                };
            }
            self.clear_phone_error(doc);
        }

        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
            debug!(
                form = %self.binding.form_id,
                generation = self.generation,
                "superseded in-flight submission"
            );
        }

        self.generation += 1;
        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());
        self.show_loading(doc);

        let form_id = &self.binding.form_id;
        let mut fields = doc.form_fields(form_id);
        fields.extend(self.binding.extra_fields.iter().cloned());
        let request = SubmissionRequest {
            form_id: form_id.clone(),
            action: self.binding.action.clone(),
            fields,
            csrf_token: doc.form_field(form_id, CSRF_FIELD).map(str::to_string),
        };

        let phone_value = self
            .binding
            .phone
            .as_ref()
            .and_then(|p| doc.value_of(&p.input_id))
            .unwrap_or_default()
            .to_string();
        self.state = FormState::Submitting;
        self.log(
            FormTraceEvent::now(
                form_id,
                self.generation,
                FormState::Validating,
                FormState::Submitting,
            )
            .with_phone(&phone_value),
        );

        SubmitStart::Started(PendingSubmission {
            generation: self.generation,
            request,
            cancel,
        })
    }

    /// Feed the transport's answer back. Stale tickets are dropped.
    pub fn complete(
        &mut self,
        doc: &mut Document,
        presenter: &mut DialogPresenter,
        ticket: &PendingSubmission,
        outcome: Result<SubmissionResponse, PageError>,
    ) -> Completion {
        if ticket.generation != self.generation
            || self.state != FormState::Submitting
            || ticket.cancel.is_cancelled()
        {
            debug!(
                form = %self.binding.form_id,
                ticket = ticket.generation,
                current = self.generation,
                "stale completion dropped"
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        let outcome = outcome.and_then(SubmissionResponse::into_verdict);
        let detail = outcome.as_ref().err().map(|e| {
            warn!(form = %self.binding.form_id, kind = ?e.kind(), "submission failed: {}", e);
            e.to_string()
        });

        let result = SubmissionResult::from_outcome(
            outcome,
            &self.messages.request_number_placeholder,
            &self.messages.fallback_error,
        );
        let settled = if result.is_success() {
            FormState::Success
        } else {
            FormState::Failure
        };
        self.enter(settled, detail.as_deref());

        let presented = self.present(doc, presenter, &result);
        self.restore_control(doc);
        if let Err(e) = presented {
            warn!(form = %self.binding.form_id, "could not present result: {}", e);
        }

        self.enter(FormState::Idle, None);
        Completion::Presented(result)
    }

    /// Run a whole attempt synchronously through `transport`.
    pub fn submit(
        &mut self,
        doc: &mut Document,
        presenter: &mut DialogPresenter,
        transport: &dyn Transport,
    ) -> SubmitOutcome {
        let ticket = match self.begin_submit(doc) {
            SubmitStart::Started(ticket) => ticket,
            SubmitStart::Blocked { message } => return SubmitOutcome::Blocked { message },
            SubmitStart::Ignored => return SubmitOutcome::Ignored,
        };

        let outcome = transport.send(&ticket.request, &ticket.cancel);
        match self.complete(doc, presenter, &ticket, outcome) {
            Completion::Presented(result) => SubmitOutcome::Presented(result),
            Completion::Stale => SubmitOutcome::Stale,
        }
    }

    fn present(
        &self,
        doc: &mut Document,
        presenter: &mut DialogPresenter,
        result: &SubmissionResult,
    ) -> Result<(), PageError> {
        match result {
            SubmissionResult::Success { request_number } => {
                doc.set_text(&self.binding.request_number_id, request_number)?;
                presenter.show(doc, &self.binding.success_dialog_id)?;
                doc.reset_form(&self.binding.form_id);
            }
            SubmissionResult::Failure { message } => {
                doc.set_text(&self.binding.error_message_id, message)?;
                presenter.show(doc, &self.binding.error_dialog_id)?;
            }
        }
        Ok(())
    }

    fn show_loading(&self, doc: &mut Document) {
        if let Some(label) = doc.get_mut(&self.binding.label_id) {
            label.text = self.messages.busy_label.clone();
        }
        if let Some(spinner) = doc.get_mut(&self.binding.spinner_id) {
            spinner.remove_class(HIDDEN_CLASS);
        }
        if let Some(control) = doc.get_mut(&self.binding.submit_control_id) {
            control.disabled = true;
        }
    }

    fn restore_control(&self, doc: &mut Document) {
        if let Some(label) = doc.get_mut(&self.binding.label_id) {
            label.text = self.idle_label.clone();
        }
        if let Some(spinner) = doc.get_mut(&self.binding.spinner_id) {
            spinner.add_class(HIDDEN_CLASS);
        }
        if let Some(control) = doc.get_mut(&self.binding.submit_control_id) {
            control.disabled = false;
        }
    }

    fn show_phone_error(&self, doc: &mut Document) {
        let Some(phone) = &self.binding.phone else { return };
        if let Some(error) = doc.get_mut(&phone.error_id) {
            error.text = self.messages.validation.clone();
        }
        if let Some(input) = doc.get_mut(&phone.input_id) {
            input.add_class(INVALID_CLASS);
        }
    }

    fn clear_phone_error(&self, doc: &mut Document) {
        let Some(phone) = &self.binding.phone else { return };
        if let Some(error) = doc.get_mut(&phone.error_id) {
            error.text.clear();
        }
        if let Some(input) = doc.get_mut(&phone.input_id) {
            input.remove_class(INVALID_CLASS);
        }
    }

    fn enter(&mut self, to: FormState, detail: Option<&str>) {
        let mut event = FormTraceEvent::now(&self.binding.form_id, self.generation, self.state, to);
        if let Some(d) = detail {
            event = event.with_detail(d);
        }
        if matches!(to, FormState::Success | FormState::Failure) {
            event = event.with_outcome(format!("{:?}", to).to_lowercase());
        }
        self.state = to;
        self.log(event);
    }

    fn log(&self, event: FormTraceEvent) {
        self.tracer.log(&event);
    }
}
