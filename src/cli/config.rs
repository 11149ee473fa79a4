use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    form::{
        binding::{FormConfig, default_forms},
        controller::Messages,
    },
    phone::formatter::PhoneRule,
};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "lead-forms",
    version,
    about = "Headless driver for the site's lead forms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: lead-forms.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format a raw phone number and report whether it is complete
    Format {
        /// Raw input as typed or pasted
        raw: String,

        /// Completeness rule: strict or pattern (default from config)
        #[arg(long)]
        rule: Option<String>,

        /// Treat input as pasted text
        #[arg(long)]
        paste: bool,
    },

    /// Fill a form and submit it to its endpoint
    Submit {
        /// Form id, e.g. consultationForm
        #[arg(long)]
        form: String,

        /// Phone number typed into the form's phone field
        #[arg(long)]
        phone: Option<String>,

        /// Extra field as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Override the form action URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Anti-forgery token placed in the form
        #[arg(long)]
        csrf_token: Option<String>,
    },

    /// Page through a load-more card endpoint
    LoadMore {
        /// Endpoint URL
        #[arg(long)]
        endpoint: String,

        /// Cards already on the page
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Number of batches to fetch
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Offset step per batch
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `lead-forms.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_forms")]
    pub forms: Vec<FormConfig>,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub phone: PhoneConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            forms: default_forms(),
            messages: Messages::default(),
            phone: PhoneConfig::default(),
            http: HttpConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhoneConfig {
    #[serde(default)]
    pub rule: PhoneRule,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    /// Base for relative form actions
    pub base_url: Option<String>,
    /// Absent means no timeout
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL transition trace; disabled when absent
    pub path: Option<String>,
}

impl AppConfig {
    pub fn form(&self, form_id: &str) -> Option<&FormConfig> {
        self.forms.iter().find(|f| f.form_id == form_id)
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.http.timeout_secs.map(std::time::Duration::from_secs)
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("lead-forms.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// `strict` / `pattern`; anything else is rejected.
pub fn parse_rule(name: &str) -> Result<PhoneRule, String> {
    match name.to_ascii_lowercase().as_str() {
        "strict" => Ok(PhoneRule::Strict),
        "pattern" => Ok(PhoneRule::Pattern),
        other => Err(format!("unknown phone rule '{}' (expected strict or pattern)", other)),
    }
}

/// Split `name=value`; the value may itself contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("field '{}' is not name=value", raw)),
    }
}
