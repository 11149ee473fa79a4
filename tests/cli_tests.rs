use std::io::Write;

use clap::Parser;
use lead_forms::cli::commands::{build_tracer, cmd_format};
use lead_forms::cli::config::{AppConfig, Cli, Commands, load_config, parse_field, parse_rule};
use lead_forms::phone::formatter::PhoneRule;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_format_minimal() {
    let cli = Cli::parse_from(["lead-forms", "format", "9991234567"]);
    match cli.command {
        Commands::Format { raw, rule, paste } => {
            assert_eq!(raw, "9991234567");
            assert_eq!(rule, None);
            assert!(!paste);
        }
        _ => panic!("Expected Format command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_submit_all_args() {
    let cli = Cli::parse_from([
        "lead-forms",
        "-vv",
        "submit",
        "--form",
        "partnerForm",
        "--phone",
        "9991234567",
        "--field",
        "name=Партнер",
        "--field",
        "email=partner@example.com",
        "--endpoint",
        "https://example.org/requests/partner/",
        "--csrf-token",
        "abc",
    ]);
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Submit {
            form,
            phone,
            fields,
            endpoint,
            csrf_token,
        } => {
            assert_eq!(form, "partnerForm");
            assert_eq!(phone.as_deref(), Some("9991234567"));
            assert_eq!(fields, ["name=Партнер", "email=partner@example.com"]);
            assert_eq!(endpoint.as_deref(), Some("https://example.org/requests/partner/"));
            assert_eq!(csrf_token.as_deref(), Some("abc"));
        }
        _ => panic!("Expected Submit command"),
    }
}

#[test]
fn cli_parse_load_more_defaults() {
    let cli = Cli::parse_from([
        "lead-forms",
        "load-more",
        "--endpoint",
        "http://localhost/load-more/",
        "--config",
        "site.yaml",
    ]);
    assert_eq!(cli.config.as_deref(), Some("site.yaml"));
    match cli.command {
        Commands::LoadMore {
            endpoint,
            offset,
            pages,
            page_size,
        } => {
            assert_eq!(endpoint, "http://localhost/load-more/");
            assert_eq!(offset, 0);
            assert_eq!(pages, 1);
            assert_eq!(page_size, 10);
        }
        _ => panic!("Expected LoadMore command"),
    }
}

#[test]
fn cli_submit_requires_form() {
    assert!(Cli::try_parse_from(["lead-forms", "submit", "--phone", "1"]).is_err());
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn missing_config_file_gives_defaults() {
    let config = load_config(Some("/nonexistent/lead-forms.yaml"));
    assert_eq!(config.forms.len(), 4);
    assert_eq!(config.phone.rule, PhoneRule::Strict);
    assert!(config.http.timeout_secs.is_none());
    assert!(config.timeout().is_none());
    assert!(config.trace.path.is_none());
}

#[test]
fn config_file_overrides_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
forms:
  - form_id: callbackForm
    action: /requests/callback/
    phone_input_id: callback-phone
    extra_fields:
      source: footer
messages:
  busy_label: "Sending..."
phone:
  rule: pattern
http:
  base_url: https://example.org
  timeout_secs: 15
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str());

    assert_eq!(config.forms.len(), 1);
    let form = config.form("callbackForm").unwrap();
    assert_eq!(form.action, "/requests/callback/");
    assert_eq!(form.success_dialog_id, "successModal");
    assert_eq!(form.extra_fields.get("source").map(String::as_str), Some("footer"));
    assert_eq!(form.resolve().phone.unwrap().error_id, "callback-phoneError");

    assert_eq!(config.messages.busy_label, "Sending...");
    assert_eq!(config.messages.request_number_placeholder, "12345");
    assert_eq!(config.phone.rule, PhoneRule::Pattern);
    assert_eq!(config.http.base_url.as_deref(), Some("https://example.org"));
    assert_eq!(config.timeout(), Some(std::time::Duration::from_secs(15)));
}

#[test]
fn malformed_config_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "forms: [this is: not: valid").unwrap();

    let config = load_config(file.path().to_str());
    assert_eq!(config.forms.len(), 4);
}

#[test]
fn default_config_round_trips_through_yaml() {
    let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
    let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back.forms, AppConfig::default().forms);
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn parse_rule_accepts_known_names() {
    assert_eq!(parse_rule("strict"), Ok(PhoneRule::Strict));
    assert_eq!(parse_rule("Pattern"), Ok(PhoneRule::Pattern));
    assert!(parse_rule("regex").is_err());
}

#[test]
fn parse_field_splits_on_first_equals() {
    assert_eq!(parse_field("name=Иван"), Ok(("name".into(), "Иван".into())));
    assert_eq!(parse_field("q=a=b"), Ok(("q".into(), "a=b".into())));
    assert_eq!(parse_field("empty="), Ok(("empty".into(), "".into())));
    assert!(parse_field("novalue").is_err());
    assert!(parse_field("=x").is_err());
}

#[test]
fn format_command_reports_completeness() {
    let config = AppConfig::default();
    assert!(cmd_format(&config, "9991234567", None, false).unwrap());
    assert!(!cmd_format(&config, "999123", None, false).unwrap());
    assert!(cmd_format(&config, "8 999 123 45 67", Some("strict"), true).unwrap());
    assert!(cmd_format(&config, "x", Some("bogus"), false).is_err());
}

#[test]
fn tracer_is_disabled_without_path() {
    assert!(!build_tracer(&AppConfig::default()).is_enabled());
}
