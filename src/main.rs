use anyhow::Context;
use clap::Parser;
use site_bootstrap::adapters::customizer_for;
use site_bootstrap::config::cli::LogFormat;
use site_bootstrap::config::env_file::{load_env_file, Environment};
use site_bootstrap::config::loader;
use site_bootstrap::config::toml_config::TomlConfig;
use site_bootstrap::core::{CommandRunner, RunReport};
use site_bootstrap::utils::logger;
use site_bootstrap::{
    BootstrapConfig, CliConfig, DryRunRunner, OrchestrationError, Orchestrator, OutputMode,
    ProcessRunner,
};
use std::path::Path;
use std::sync::Arc;

fn fail(e: &OrchestrationError) -> ! {
    tracing::error!(
        "❌ Setup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn load_config(cli: &CliConfig) -> site_bootstrap::Result<BootstrapConfig> {
    let env = Environment::from_process(load_env_file(&cli.env_file)?);

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            Some(TomlConfig::from_file(path, &env)?)
        }
        None => None,
    };

    loader::resolve(&cli.overrides(), file.as_ref(), &env)
}

fn display_config_summary(orchestrator: &Orchestrator, cli: &CliConfig) {
    let config = orchestrator.config();
    println!("📋 Configuration Summary:");
    println!("  Site: {}", config.site_identifier);
    println!("  Project: {}", config.project_dir().display());
    println!(
        "  Steps: {}",
        orchestrator
            .step_kinds()
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    if cli.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn write_summary(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing run report to {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Text => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting site-bootstrap");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let runner: Arc<dyn CommandRunner> = if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - commands will be logged, not executed");
        Arc::new(DryRunRunner::new())
    } else if cli.stream_output {
        Arc::new(ProcessRunner::new(OutputMode::Inherit))
    } else {
        Arc::new(ProcessRunner::new(OutputMode::Capture))
    };
    let customizer = Arc::from(customizer_for(&config));

    let orchestrator = Orchestrator::new(config, runner, customizer).with_monitoring(cli.monitor);

    display_config_summary(&orchestrator, &cli);

    let outcome = orchestrator.run_with_report().await;
    let report = &outcome.report;

    // 失敗時也寫出報告，記錄已完成與失敗的步驟
    if let Some(path) = &cli.summary {
        if let Err(e) = write_summary(path, report) {
            tracing::warn!("⚠️ Could not write run report: {:#}", e);
        }
    }
    tracing::debug!("Execution summary: {:?}", report.execution_summary());

    match &outcome.error {
        None => println!(
            "✅ Site {} built in {}",
            report.site_identifier,
            report.project_dir.display()
        ),
        Some(e) => fail(e),
    }
}
