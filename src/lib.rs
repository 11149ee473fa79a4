use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    dialog::{
        chrome::{BACKDROP_CLASS, DialogChrome},
        presenter::{CloseTrigger, DialogPresenter},
    },
    form::{
        binding::FormConfig,
        controller::{FormSubmissionController, Messages, SubmitOutcome},
        submission::Transport,
    },
    page::document::Document,
    phone::formatter::PhoneRule,
    trace::logger::TraceLogger,
};

pub mod cli;
pub mod dialog;
pub mod form;
pub mod page;
pub mod phone;
pub mod trace;
pub mod widgets;

/// A loaded page: the document, its one dialog presenter and a controller
/// per form found on it.
pub struct Page {
    pub document: Document,
    pub presenter: DialogPresenter,
    pub controllers: Vec<FormSubmissionController>,
}

impl Page {
    /// Page-load wiring. Forms whose root element is absent are skipped,
    /// as are forms missing part of their markup (with a warning).
    pub fn wire(
        document: Document,
        forms: &[FormConfig],
        messages: &Messages,
        rule: PhoneRule,
        tracer: Arc<TraceLogger>,
    ) -> Self {
        let mut presenter = DialogPresenter::new();
        let mut controllers = Vec::new();

        for config in forms {
            if !document.contains_id(&config.form_id) {
                debug!(form = %config.form_id, "form not on this page");
                continue;
            }
            match FormSubmissionController::attach(
                &document,
                &mut presenter,
                config,
                messages.clone(),
                rule,
                tracer.clone(),
            ) {
                Ok(controller) => controllers.push(controller),
                Err(e) => warn!(form = %config.form_id, "form left unwired: {}", e),
            }
        }

        Self {
            document,
            presenter,
            controllers,
        }
    }

    /// Build bare markup for `forms` and wire it.
    pub fn scaffold(
        forms: &[FormConfig],
        messages: &Messages,
        rule: PhoneRule,
        csrf_token: Option<&str>,
        tracer: Arc<TraceLogger>,
    ) -> Self {
        let mut document = Document::new();
        for config in forms {
            config
                .resolve()
                .scaffold(&mut document, &messages.idle_label, csrf_token);
        }
        Self::wire(document, forms, messages, rule, tracer)
    }

    pub fn controller(&self, form_id: &str) -> Option<&FormSubmissionController> {
        self.controllers.iter().find(|c| c.form_id() == form_id)
    }

    pub fn controller_mut(&mut self, form_id: &str) -> Option<&mut FormSubmissionController> {
        self.controllers.iter_mut().find(|c| c.form_id() == form_id)
    }

    /// Simulate typing into the form's phone field.
    pub fn type_phone(&mut self, form_id: &str, raw: &str) -> Option<String> {
        let controller = self.controllers.iter().find(|c| c.form_id() == form_id)?;
        Some(controller.on_phone_input(&mut self.document, raw))
    }

    pub fn submit(&mut self, form_id: &str, transport: &dyn Transport) -> Option<SubmitOutcome> {
        let controller = self.controllers.iter_mut().find(|c| c.form_id() == form_id)?;
        Some(controller.submit(&mut self.document, &mut self.presenter, transport))
    }

    pub fn close_dialog(&mut self, dialog_id: &str, trigger: CloseTrigger) -> bool {
        self.presenter.hide(&mut self.document, dialog_id, trigger)
    }

    /// Backdrop click or Escape: closes the topmost dialog.
    pub fn dismiss_dialog(&mut self, trigger: CloseTrigger) -> Option<String> {
        self.presenter.dismiss(&mut self.document, trigger)
    }

    pub fn overlay_count(&self) -> usize {
        self.document.count_class(BACKDROP_CLASS)
    }

    pub fn is_scroll_locked(&self) -> bool {
        DialogChrome::is_locked(&self.document)
    }
}
