pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{CommandCustomizer, DryRunRunner, NoopCustomizer, OutputMode, ProcessRunner};
pub use config::BootstrapConfig;
pub use core::orchestrator::{Orchestrator, RunOutcome};
pub use utils::error::{OrchestrationError, Result};
