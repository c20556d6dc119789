//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jadwa_core::{City, ReportLanguage, ResponseMode, StudyRequest};
use jadwa_runtime::RuntimeConfig;

/// AI feasibility studies for projects in Saudi cities
#[derive(Parser)]
#[command(name = "jadwa", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for scripts
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a feasibility study
    Study {
        #[command(flatten)]
        input: StudyArgs,
        /// Write the study as a standalone HTML document
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write the study as Markdown
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
    /// Print the prompts a study would send, without calling the model
    Prompt {
        #[command(flatten)]
        input: StudyArgs,
    },
    /// Parse a saved model answer and print the study
    Parse {
        /// Layout of the saved answer (structured or delimited)
        #[arg(short, long, default_value = "structured")]
        mode: ResponseMode,
        /// File holding the answer (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Read the lead log
    Leads {
        #[command(subcommand)]
        action: LeadsAction,
    },
    /// Configure jadwa settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Project inputs shared by `study` and `prompt`.
#[derive(Args, Clone, Debug)]
pub struct StudyArgs {
    /// Project name (e.g. "Specialty coffee shop")
    #[arg(short, long)]
    pub project: String,
    /// City: Riyadh, Jeddah, Dammam or any other name
    #[arg(short, long, default_value = "Riyadh")]
    pub city: City,
    /// Capital in SAR
    #[arg(long)]
    pub capital: f64,
    /// Free-text project details
    #[arg(short, long)]
    pub details: Option<String>,
    /// Answer layout: structured (JSON) or delimited. Uses JADWA_MODE if not set.
    #[arg(short, long)]
    pub mode: Option<ResponseMode>,
    /// Report language: ar or en. Uses JADWA_LANGUAGE if not set.
    #[arg(short, long)]
    pub language: Option<ReportLanguage>,
    /// Model to use (e.g. gemini-2.5-flash). Uses JADWA_MODEL if not set.
    #[arg(long)]
    pub model: Option<String>,
}

impl StudyArgs {
    pub fn request(&self) -> jadwa_core::Result<StudyRequest> {
        let request = StudyRequest::new(self.project.clone(), self.city.clone(), self.capital)?;
        Ok(match &self.details {
            Some(details) => request.with_details(details.clone()),
            None => request,
        })
    }

    /// Flags override the environment.
    pub fn apply(&self, mut config: RuntimeConfig) -> RuntimeConfig {
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(language) = self.language {
            config = config.with_language(language);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum LeadsAction {
    /// List logged requests (needs the admin token)
    List {
        /// Admin token; its SHA-256 must match JADWA_ADMIN_TOKEN_SHA256
        #[arg(short, long)]
        token: String,
    },
    /// Print the lead log location
    Path,
    /// Print the digest to put in JADWA_ADMIN_TOKEN_SHA256 for a token
    Digest {
        /// Admin token to hash
        token: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Store the Gemini API key in ~/.jadwa/env
    Api,
    /// Show the effective configuration (secrets masked)
    Show,
}
