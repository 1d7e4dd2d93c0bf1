use crate::domain::model::{CommandOutput, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 執行外部命令的能力。非零退出碼不是 Err，由調用方判斷；
/// Err 只代表命令無法啟動或等待失敗。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

#[derive(Debug, Clone)]
pub struct CustomizeContext {
    pub site_identifier: String,
    pub project_dir: PathBuf,
}

#[async_trait]
pub trait Customizer: Send + Sync {
    async fn customize(&self, context: &CustomizeContext, runner: &dyn CommandRunner) -> Result<()>;

    fn describe(&self) -> String;
}
