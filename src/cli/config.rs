use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::collect::collector::CollectorConfig;
use crate::fill::script_model::GenerateOptions;
use crate::fill::trust::UriMatchStrategy;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-autofill",
    version,
    about = "Index page forms and generate autofill scripts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: page-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the page snapshot of a document fixture
    Collect {
        /// Document fixture (JSON)
        #[arg(long)]
        document: String,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate the fill script for a credential
    Fill {
        /// Document fixture (JSON) to collect first
        #[arg(long, conflicts_with = "snapshot", required_unless_present = "snapshot")]
        document: Option<String>,

        /// Previously collected snapshot (JSON)
        #[arg(long)]
        snapshot: Option<String>,

        /// Credential file (YAML)
        #[arg(long)]
        credential: String,

        /// Top-level tab address (default: the page address)
        #[arg(long)]
        tab_url: Option<String>,

        /// One-time code returned for every TOTP secret
        #[arg(long)]
        totp_code: Option<String>,

        /// Append decision events to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },

    /// List forms that hold password fields
    Forms {
        /// Document fixture (JSON)
        #[arg(long)]
        document: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub collect: CollectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    #[serde(default)]
    pub skip_username_only_fill: bool,
    #[serde(default)]
    pub only_empty_fields: bool,
    #[serde(default)]
    pub only_visible_fields: bool,
    #[serde(default)]
    pub fill_new_password: bool,
    #[serde(default = "default_true")]
    pub allow_totp_autofill: bool,
    #[serde(default)]
    pub auto_submit_login: bool,
    #[serde(default)]
    pub default_uri_match: UriMatchStrategy,
    #[serde(default)]
    pub legacy_combined_expiry: bool,
    /// `false` withholds scripts for untrusted iframes
    pub allow_untrusted_iframe: Option<bool>,
    #[serde(default)]
    pub auto_copy_totp: bool,
    /// Groups of domains treated as one site
    #[serde(default)]
    pub equivalent_domains: Vec<Vec<String>>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            skip_username_only_fill: false,
            only_empty_fields: false,
            only_visible_fields: false,
            fill_new_password: false,
            allow_totp_autofill: true,
            auto_submit_login: false,
            default_uri_match: UriMatchStrategy::Domain,
            legacy_combined_expiry: false,
            allow_untrusted_iframe: None,
            auto_copy_totp: false,
            equivalent_domains: Vec::new(),
        }
    }
}

impl FillConfig {
    pub fn generate_options(&self, tab_url: &str) -> GenerateOptions {
        GenerateOptions {
            skip_username_only_fill: self.skip_username_only_fill,
            only_empty_fields: self.only_empty_fields,
            only_visible_fields: self.only_visible_fields,
            fill_new_password: self.fill_new_password,
            allow_totp_autofill: self.allow_totp_autofill,
            auto_submit_login: self.auto_submit_login,
            tab_url: tab_url.to_string(),
            page_url: None,
            default_uri_match: self.default_uri_match,
            legacy_combined_expiry: self.legacy_combined_expiry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    #[serde(default = "default_rebuild_timeout_ms")]
    pub rebuild_timeout_ms: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            max_fields: default_max_fields(),
            debounce_ms: default_debounce_ms(),
            max_wait_ms: default_max_wait_ms(),
            rebuild_timeout_ms: default_rebuild_timeout_ms(),
        }
    }
}

impl From<&CollectConfig> for CollectorConfig {
    fn from(config: &CollectConfig) -> Self {
        CollectorConfig {
            max_fields: config.max_fields,
            debounce_ms: config.debounce_ms,
            max_wait_ms: config.max_wait_ms,
            rebuild_timeout_ms: config.rebuild_timeout_ms,
        }
    }
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_max_fields() -> usize { 100 }
fn default_debounce_ms() -> u64 { 100 }
fn default_max_wait_ms() -> u64 { 500 }
fn default_rebuild_timeout_ms() -> u64 { 1000 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("page-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
