use crate::domain::model::CommandSpec;
use crate::domain::ports::{CommandRunner, CustomizeContext, Customizer};
use crate::utils::error::{OrchestrationError, Result};
use async_trait::async_trait;

/// 沒有配置自訂步驟時使用
#[derive(Debug, Clone, Default)]
pub struct NoopCustomizer;

#[async_trait]
impl Customizer for NoopCustomizer {
    async fn customize(&self, context: &CustomizeContext, _runner: &dyn CommandRunner) -> Result<()> {
        tracing::info!(
            "No customization configured for {}; leaving {} as generated",
            context.site_identifier,
            context.project_dir.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

/// 在專案目錄中執行外部自訂命令
#[derive(Debug, Clone)]
pub struct CommandCustomizer {
    spec: CommandSpec,
}

impl CommandCustomizer {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Customizer for CommandCustomizer {
    async fn customize(&self, context: &CustomizeContext, runner: &dyn CommandRunner) -> Result<()> {
        tracing::debug!(
            "Customizing {} for {}",
            context.project_dir.display(),
            context.site_identifier
        );

        let output = runner.run(&self.spec).await?;
        if output.is_success() {
            return Ok(());
        }

        Err(OrchestrationError::CustomizeFailed {
            exit_code: output.exit_code,
            message: format!(
                "'{}' exited with {:?}: {}",
                self.spec.display(),
                output.exit_code,
                output.combined_tail(20)
            ),
        })
    }

    fn describe(&self) -> String {
        self.spec.display()
    }
}
