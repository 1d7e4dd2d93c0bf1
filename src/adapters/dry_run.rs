use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// 只記錄、不執行的命令執行器，每次調用都視為成功
#[derive(Debug, Default)]
pub struct DryRunRunner {
    planned: Mutex<Vec<CommandSpec>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planned(&self) -> Vec<CommandSpec> {
        self.planned
            .lock()
            .map(|planned| planned.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::info!("🔍 [dry-run] would run: {}", spec.display());
        if let Ok(mut planned) = self.planned.lock() {
            planned.push(spec.clone());
        }
        Ok(CommandOutput::success())
    }
}
