use crate::config::BootstrapConfig;
use crate::domain::model::{CommandSpec, StepKind, StepOutcome};
use crate::domain::ports::{CommandRunner, CustomizeContext, Customizer};
use crate::utils::error::{OrchestrationError, Result};
use async_trait::async_trait;

/// 輸出尾端保留的行數
const OUTPUT_TAIL_LINES: usize = 40;

/// 所有步驟共用的能力與配置
pub struct StepContext<'a> {
    pub config: &'a BootstrapConfig,
    pub runner: &'a dyn CommandRunner,
    pub customizer: &'a dyn Customizer,
}

#[async_trait]
pub trait Step: Send + Sync {
    fn kind(&self) -> StepKind;

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome>;
}

/// 依執行順序排列的四個步驟
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(EnsureScaffold),
        Box::new(InstallDependencies),
        Box::new(Customize),
        Box::new(Build),
    ]
}

fn step_failure(kind: StepKind, exit_code: Option<i32>, details: String) -> OrchestrationError {
    match kind {
        StepKind::Scaffold => OrchestrationError::ScaffoldFailed { exit_code, details },
        StepKind::Install => OrchestrationError::InstallFailed { exit_code, details },
        StepKind::Customize => OrchestrationError::CustomizeFailed {
            exit_code,
            message: details,
        },
        StepKind::Build => OrchestrationError::BuildFailed { exit_code, details },
    }
}

/// 執行命令，啟動失敗或非零退出都轉成該步驟的錯誤
async fn run_checked(kind: StepKind, runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<()> {
    tracing::info!("🔧 Running: {}", spec.display());

    let output = runner
        .run(spec)
        .await
        .map_err(|e| step_failure(kind, None, format!("could not run '{}': {}", spec.program, e)))?;

    if output.is_success() {
        return Ok(());
    }

    let tail = output.combined_tail(OUTPUT_TAIL_LINES);
    let details = if tail.is_empty() {
        format!("'{}' returned a failure status", spec.display())
    } else {
        format!("'{}' returned a failure status:\n{}", spec.display(), tail)
    };
    Err(step_failure(kind, output.exit_code, details))
}

/// 專案目錄存在即跳過建立
pub struct EnsureScaffold;

#[async_trait]
impl Step for EnsureScaffold {
    fn kind(&self) -> StepKind {
        StepKind::Scaffold
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome> {
        let project_dir = ctx.config.project_dir();

        if project_dir.exists() {
            if !project_dir.is_dir() {
                tracing::warn!(
                    "⚠️ {} exists but is not a directory",
                    project_dir.display()
                );
            }
            tracing::info!(
                "⏭️ Next.js app already exists at {}. Skipping creation.",
                project_dir.display()
            );
            return Ok(StepOutcome::Skipped {
                reason: format!("{} already exists", project_dir.display()),
            });
        }

        tracing::info!("🏗️ Creating Next.js app at {}...", project_dir.display());
        // TODO: decide whether the site identifier should shape the scaffold (name, metadata)
        tracing::debug!(
            "Site identifier {} is not passed to the scaffold generator",
            ctx.config.site_identifier
        );

        let spec = ctx.config.scaffold_command().ok_or_else(|| {
            step_failure(
                StepKind::Scaffold,
                None,
                "no scaffold generator configured".to_string(),
            )
        })?;

        run_checked(StepKind::Scaffold, ctx.runner, &spec).await?;
        Ok(StepOutcome::Completed)
    }
}

pub struct InstallDependencies;

#[async_trait]
impl Step for InstallDependencies {
    fn kind(&self) -> StepKind {
        StepKind::Install
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome> {
        tracing::info!("📦 Installing Node.js dependencies...");
        run_checked(StepKind::Install, ctx.runner, &ctx.config.install_command()).await?;
        Ok(StepOutcome::Completed)
    }
}

pub struct Customize;

#[async_trait]
impl Step for Customize {
    fn kind(&self) -> StepKind {
        StepKind::Customize
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome> {
        tracing::info!("🎨 Customizing site ({})...", ctx.customizer.describe());

        let context = CustomizeContext {
            site_identifier: ctx.config.site_identifier.clone(),
            project_dir: ctx.config.project_dir(),
        };

        match ctx.customizer.customize(&context, ctx.runner).await {
            Ok(()) => Ok(StepOutcome::Completed),
            Err(e @ OrchestrationError::CustomizeFailed { .. }) => Err(e),
            Err(e) => Err(step_failure(StepKind::Customize, None, e.to_string())),
        }
    }
}

pub struct Build;

#[async_trait]
impl Step for Build {
    fn kind(&self) -> StepKind {
        StepKind::Build
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome> {
        tracing::info!("🏭 Building Next.js app...");
        run_checked(StepKind::Build, ctx.runner, &ctx.config.build_command()).await?;
        tracing::info!("Next.js app built successfully.");
        Ok(StepOutcome::Completed)
    }
}
