use crate::config::loader::ConfigOverrides;
use crate::config::DEFAULT_ENV_FILE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "site-bootstrap")]
#[command(about = "Scaffold, install, customize and build a Next.js site")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Env file consulted for variables missing from the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Site identifier (overrides DOMAIN_NAME)
    #[arg(long)]
    pub site: Option<String>,

    /// Workspace root containing the project directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Project directory name
    #[arg(long)]
    pub project_dir: Option<String>,

    /// Dry run - log the commands without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Stream command output to the terminal instead of capturing it
    #[arg(long)]
    pub stream_output: bool,

    /// Write the JSON run report to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Log process resource usage around each step
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            site_identifier: self.site.clone(),
            workspace_root: self.root.clone(),
            project_dir_name: self.project_dir.clone(),
        }
    }
}
