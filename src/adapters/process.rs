use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// 擷取輸出，失敗時放進錯誤訊息
    #[default]
    Capture,
    /// 直接輸出到終端
    Inherit,
}

/// 以 tokio 子進程執行命令，逐一等待完成
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    mode: OutputMode,
}

impl ProcessRunner {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        command.stdin(Stdio::null());
        match self.mode {
            OutputMode::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        command
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("▶️ Spawning: {}", spec.display());

        let output = self.build_command(spec).output().await.map_err(|e| {
            tracing::error!("❌ Failed to spawn '{}': {}", spec.program, e);
            e
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        for line in stdout.lines() {
            tracing::debug!("[{}] {}", spec.program, line);
        }
        for line in stderr.lines() {
            tracing::debug!("[{} stderr] {}", spec.program, line);
        }

        tracing::debug!(
            "⏹️ {} exited with {:?}",
            spec.program,
            output.status.code()
        );

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout,
            stderr,
        })
    }
}
