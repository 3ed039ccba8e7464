//! CLI commands

use clap::{Args, Parser, Subcommand};
use protoscribe_protocol::{TrialParameters, DEFAULT_SECTION_REQUEST};
use std::path::PathBuf;

/// Protoscribe - clinical-trial protocol section generator
#[derive(Parser, Debug)]
#[command(name = "protoscribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to protoscribe.{jsonc,json,yml,yaml} discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one section without the TUI
    Generate(GenerateArgs),

    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Credential inspection
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Trial phase, e.g. "I" or "II"
    #[arg(long, default_value = "")]
    pub phase: String,

    /// Mechanism-of-action category
    #[arg(long, default_value = "")]
    pub moa_category: String,

    /// Specific mechanism of action
    #[arg(long, default_value = "")]
    pub specific_moa: String,

    #[arg(long, default_value = "")]
    pub cancer_type: String,

    #[arg(long, default_value = "")]
    pub subtype: String,

    /// Target length in letters (100-15000)
    #[arg(long)]
    pub length_limit: Option<u32>,

    /// Sampling temperature (0.5-1.5)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Protocol section to write
    #[arg(long, default_value = DEFAULT_SECTION_REQUEST)]
    pub section: String,

    /// Extra instructions appended to the generation prompt
    #[arg(long)]
    pub additional: Option<String>,

    /// Override the generation model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the session (text and history) as JSON
    #[arg(long)]
    pub json: bool,

    /// Also save the text as Markdown
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Also copy the text to the clipboard
    #[arg(long)]
    pub copy: bool,
}

impl GenerateArgs {
    /// Merge the flags over `base`, which carries the configured defaults
    pub fn parameters(&self, base: TrialParameters) -> TrialParameters {
        TrialParameters {
            phase: self.phase.clone(),
            moa_category: self.moa_category.clone(),
            specific_moa: self.specific_moa.clone(),
            cancer_type: self.cancer_type.clone(),
            subtype: self.subtype.clone(),
            length_limit: self.length_limit.unwrap_or(base.length_limit),
            temperature: self.temperature.unwrap_or(base.temperature),
            section_request: self.section.clone(),
            additional_request: self.additional.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (API key redacted)
    Show,
    /// Show which config file is in use
    Path,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Show whether an API key is available and where it comes from
    Status,
}
