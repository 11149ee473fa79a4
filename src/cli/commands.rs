use std::sync::Arc;

use tracing::info;

use crate::Page;
use crate::cli::config::{AppConfig, parse_field, parse_rule};
use crate::form::controller::SubmitOutcome;
use crate::form::submission::{HttpTransport, SubmissionResult};
use crate::page::document::{Document, Element};
use crate::phone::formatter::{self, PhoneRule};
use crate::trace::logger::TraceLogger;
use crate::widgets::pagination::{HttpCardSource, LoadMorePager};

// ============================================================================
// format subcommand
// ============================================================================

/// Print the canonical rendering; returns whether it passes the rule.
pub fn cmd_format(
    config: &AppConfig,
    raw: &str,
    rule: Option<&str>,
    paste: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let rule = resolve_rule(config, rule)?;
    let input = if paste {
        formatter::normalize_paste(raw)
    } else {
        raw.to_string()
    };

    let formatted = formatter::format(&input);
    let complete = rule.accepts(&formatted);
    println!("{}", formatted);
    println!("{}", if complete { "complete" } else { "incomplete" });
    Ok(complete)
}

// ============================================================================
// submit subcommand
// ============================================================================

/// Submit one form; returns whether the success dialog was shown.
pub fn cmd_submit(
    config: &AppConfig,
    form_id: &str,
    phone: Option<&str>,
    fields: &[String],
    endpoint: Option<&str>,
    csrf_token: Option<&str>,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut form_config = config
        .form(form_id)
        .cloned()
        .ok_or_else(|| format!("form '{}' is not configured", form_id))?;
    if let Some(url) = endpoint {
        form_config = form_config.with_action(url);
    }
    if form_config.action.is_empty() {
        return Err(format!("form '{}' has no action; pass --endpoint", form_id).into());
    }

    let mut page = Page::scaffold(
        std::slice::from_ref(&form_config),
        &config.messages,
        config.phone.rule,
        csrf_token,
        build_tracer(config),
    );
    if page.controller(form_id).is_none() {
        return Err(format!("form '{}' could not be wired", form_id).into());
    }

    for raw in fields {
        let (name, value) = parse_field(raw)?;
        let id = format!("{}-{}", form_id, name);
        page.document.insert(Element::new(&id, "input").in_form(form_id).named(&name));
        page.document.set_value(&id, &value)?;
    }

    if let Some(raw) = phone {
        let shown = page.type_phone(form_id, raw).unwrap_or_default();
        if verbose > 0 {
            eprintln!("Phone field: {}", shown);
        }
    }

    let transport = HttpTransport::new(config.http.base_url.as_deref(), config.timeout())?;
    let outcome = page
        .submit(form_id, &transport)
        .ok_or_else(|| format!("form '{}' could not be wired", form_id))?;

    match outcome {
        SubmitOutcome::Blocked { message } => {
            eprintln!("Blocked: {}", message);
            Ok(false)
        }
        SubmitOutcome::Presented(SubmissionResult::Success { request_number }) => {
            println!("Request accepted: {}", request_number);
            Ok(true)
        }
        SubmitOutcome::Presented(SubmissionResult::Failure { message }) => {
            println!("Submission failed: {}", message);
            Ok(false)
        }
        SubmitOutcome::Ignored | SubmitOutcome::Stale => Ok(false),
    }
}

// ============================================================================
// load-more subcommand
// ============================================================================

pub fn cmd_load_more(
    config: &AppConfig,
    endpoint: &str,
    offset: usize,
    pages: usize,
    page_size: usize,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = HttpCardSource::new(endpoint, config.timeout())?;
    let mut doc = Document::new();
    doc.insert(Element::new("cards", "div"));
    doc.insert(Element::new("load-more", "button"));

    let mut pager = LoadMorePager::new("cards", "load-more", page_size, offset);
    let mut fetched = 0;
    for _ in 0..pages {
        if !pager.load_next(&mut doc, &source)? {
            break;
        }
        fetched += 1;
        if verbose > 0 {
            eprintln!("  next offset: {}", pager.offset());
        }
    }

    let markup = doc.text_of("cards").unwrap_or_default();
    info!(batches = fetched, bytes = markup.len(), "load-more finished");
    println!(
        "Fetched {} batches ({} bytes of markup), next offset {}, has_more={}",
        fetched,
        markup.len(),
        pager.offset(),
        pager.has_more()
    );
    if verbose > 1 {
        println!("{}", markup);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn resolve_rule(config: &AppConfig, cli_rule: Option<&str>) -> Result<PhoneRule, String> {
    match cli_rule {
        Some(name) => parse_rule(name),
        None => Ok(config.phone.rule),
    }
}

/// Shared JSONL trace sink; disabled when no path is configured.
pub fn build_tracer(config: &AppConfig) -> Arc<TraceLogger> {
    Arc::new(
        config
            .trace
            .path
            .as_deref()
            .map(TraceLogger::new)
            .unwrap_or_else(TraceLogger::disabled),
    )
}
