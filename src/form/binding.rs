use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::page::{
    document::{Document, Element, HIDDEN_CLASS},
    error::PageError,
};

/// Name of the hidden anti-forgery field rendered inside each form.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// One form as declared in config. Control ids left out fall back to the
/// `<formId>SubmitButton` / `<formId>ButtonText` / `<formId>Spinner` convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub form_id: String,

    /// Submission target, absolute or relative to `http.base_url`.
    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub submit_control_id: Option<String>,
    #[serde(default)]
    pub label_id: Option<String>,
    #[serde(default)]
    pub spinner_id: Option<String>,

    #[serde(default)]
    pub phone_input_id: Option<String>,
    #[serde(default)]
    pub phone_error_id: Option<String>,

    #[serde(default = "default_success_dialog")]
    pub success_dialog_id: String,
    #[serde(default = "default_error_dialog")]
    pub error_dialog_id: String,
    #[serde(default = "default_request_number")]
    pub request_number_id: String,
    #[serde(default = "default_error_message")]
    pub error_message_id: String,

    /// Static fields appended to every submission (e.g. `source: partner`).
    #[serde(default)]
    pub extra_fields: BTreeMap<String, String>,
}

fn default_success_dialog() -> String { "successModal".to_string() }
fn default_error_dialog() -> String { "errorModal".to_string() }
fn default_request_number() -> String { "requestNumber".to_string() }
fn default_error_message() -> String { "errorMessage".to_string() }

impl FormConfig {
    pub fn new(form_id: &str) -> Self {
        Self {
            form_id: form_id.to_string(),
            action: String::new(),
            submit_control_id: None,
            label_id: None,
            spinner_id: None,
            phone_input_id: None,
            phone_error_id: None,
            success_dialog_id: default_success_dialog(),
            error_dialog_id: default_error_dialog(),
            request_number_id: default_request_number(),
            error_message_id: default_error_message(),
            extra_fields: BTreeMap::new(),
        }
    }

    pub fn with_phone(mut self, input_id: &str, error_id: &str) -> Self {
        self.phone_input_id = Some(input_id.to_string());
        self.phone_error_id = Some(error_id.to_string());
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    pub fn with_extra_field(mut self, name: &str, value: &str) -> Self {
        self.extra_fields.insert(name.to_string(), value.to_string());
        self
    }

    /// Fill in conventional ids for anything not configured.
    pub fn resolve(&self) -> FormBinding {
        let id = &self.form_id;
        FormBinding {
            form_id: id.clone(),
            action: self.action.clone(),
            submit_control_id: self
                .submit_control_id
                .clone()
                .unwrap_or_else(|| format!("{}SubmitButton", id)),
            label_id: self.label_id.clone().unwrap_or_else(|| format!("{}ButtonText", id)),
            spinner_id: self.spinner_id.clone().unwrap_or_else(|| format!("{}Spinner", id)),
            phone: self.phone_input_id.clone().map(|input_id| PhoneBinding {
                error_id: self
                    .phone_error_id
                    .clone()
                    .unwrap_or_else(|| format!("{}Error", input_id)),
                input_id,
            }),
            success_dialog_id: self.success_dialog_id.clone(),
            error_dialog_id: self.error_dialog_id.clone(),
            request_number_id: self.request_number_id.clone(),
            error_message_id: self.error_message_id.clone(),
            extra_fields: self
                .extra_fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Forms the site wires on every page load.
pub fn default_forms() -> Vec<FormConfig> {
    vec![
        FormConfig::new("consultationForm").with_phone("phone", "phoneError"),
        FormConfig::new("rehabHelpForm").with_phone("rehab-phone", "rehabPhoneError"),
        FormConfig::new("contactInfoForm").with_phone("contact-phone", "contactPhoneError"),
        FormConfig::new("partnerForm")
            .with_phone("partner-phone", "partnerPhoneError")
            .with_extra_field("source", "partner"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneBinding {
    pub input_id: String,
    pub error_id: String,
}

/// Concrete element ids one controller works against.
#[derive(Debug, Clone, PartialEq)]
pub struct FormBinding {
    pub form_id: String,
    pub action: String,
    pub submit_control_id: String,
    pub label_id: String,
    pub spinner_id: String,
    pub phone: Option<PhoneBinding>,
    pub success_dialog_id: String,
    pub error_dialog_id: String,
    pub request_number_id: String,
    pub error_message_id: String,
    pub extra_fields: Vec<(String, String)>,
}

impl FormBinding {
    /// Check the page exposes everything this form needs.
    pub fn verify(&self, doc: &Document) -> Result<(), PageError> {
        let context = format!("form '{}'", self.form_id);
        let mut required = vec![
            &self.form_id,
            &self.submit_control_id,
            &self.label_id,
            &self.spinner_id,
            &self.success_dialog_id,
            &self.error_dialog_id,
            &self.request_number_id,
            &self.error_message_id,
        ];
        if let Some(phone) = &self.phone {
            required.push(&phone.input_id);
            required.push(&phone.error_id);
        }
        for id in required {
            doc.require(id, &context)?;
        }
        Ok(())
    }

    /// Render the markup this binding expects into a bare document.
    /// Existing elements (shared dialogs, say) are left alone.
    pub fn scaffold(&self, doc: &mut Document, idle_label: &str, csrf_token: Option<&str>) {
        let form = &self.form_id;
        let mut add = |el: Element| {
            if !doc.contains_id(&el.id) {
                doc.insert(el);
            }
        };

        add(Element::new(form, "form"));
        add(Element::new(&self.submit_control_id, "button")
            .inside(form)
            .with_class("rehab-btn"));
        add(Element::new(&self.label_id, "span")
            .inside(&self.submit_control_id)
            .with_class("button-text")
            .with_text(idle_label));
        add(Element::new(&self.spinner_id, "span")
            .inside(&self.submit_control_id)
            .with_class("spinner-border")
            .with_class(HIDDEN_CLASS));

        if let Some(phone) = &self.phone {
            add(Element::new(&phone.input_id, "input").in_form(form).named("phone"));
            add(Element::new(&phone.error_id, "div").inside(form).with_class("invalid-feedback"));
        }
        if let Some(token) = csrf_token {
            add(Element::new(&format!("{}-{}", form, CSRF_FIELD), "input")
                .in_form(form)
                .named(CSRF_FIELD)
                .with_value(token));
        }

        add(Element::new(&self.success_dialog_id, "div").with_class("modal"));
        add(Element::new(&self.request_number_id, "span").inside(&self.success_dialog_id));
        add(Element::new(&self.error_dialog_id, "div").with_class("modal"));
        add(Element::new(&self.error_message_id, "p").inside(&self.error_dialog_id));
    }
}
