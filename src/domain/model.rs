use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 一次外部命令調用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    /// 由 `[program, args...]` 形式的命令列建立
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env.extend(vars);
        self
    }

    /// 日誌用的命令列文字
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        let line = parts.join(" ");

        match &self.working_dir {
            Some(dir) => format!("{} (in {})", line, dir.display()),
            None => line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 被信號終止時為 None
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stderr 與 stdout 的最後幾行，用於錯誤訊息
    pub fn combined_tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .chain(self.stdout.lines())
            .filter(|line| !line.trim().is_empty())
            .collect();

        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Scaffold,
    Install,
    Customize,
    Build,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Scaffold => "scaffold",
            StepKind::Install => "install",
            StepKind::Customize => "customize",
            StepKind::Build => "build",
        }
    }

    /// 步驟成功後進入的狀態
    pub fn completed_state(&self) -> RunState {
        match self {
            StepKind::Scaffold => RunState::Scaffolded,
            StepKind::Install => RunState::DependenciesInstalled,
            StepKind::Customize => RunState::Customized,
            StepKind::Build => RunState::Built,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed,
    Skipped { reason: String },
    Failed { error: String },
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub kind: StepKind,
    pub outcome: StepOutcome,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

/// 編排執行狀態：線性前進，任何失敗直接進入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Scaffolded,
    DependenciesInstalled,
    Customized,
    Built,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::Scaffolded => "scaffolded",
            RunState::DependenciesInstalled => "dependencies_installed",
            RunState::Customized => "customized",
            RunState::Built => "built",
            RunState::Failed => "failed",
        }
    }

    pub fn valid_next_states(&self) -> Vec<RunState> {
        match self {
            RunState::NotStarted => vec![RunState::Scaffolded, RunState::Failed],
            RunState::Scaffolded => vec![RunState::DependenciesInstalled, RunState::Failed],
            RunState::DependenciesInstalled => vec![RunState::Customized, RunState::Failed],
            RunState::Customized => vec![RunState::Built, RunState::Failed],
            RunState::Built => vec![],
            RunState::Failed => vec![],
        }
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        self.valid_next_states().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Built | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub site_identifier: String,
    pub project_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub final_state: RunState,
}

impl RunReport {
    pub fn step(&self, kind: StepKind) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.kind == kind)
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|record| record.duration).sum()
    }

    /// 執行摘要
    pub fn execution_summary(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut summary = serde_json::Map::new();

        summary.insert(
            "site_identifier".to_string(),
            serde_json::Value::String(self.site_identifier.clone()),
        );
        summary.insert(
            "final_state".to_string(),
            serde_json::Value::String(self.final_state.as_str().to_string()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((self.total_duration().as_millis() as u64).into()),
        );

        let executed: Vec<serde_json::Value> = self
            .steps
            .iter()
            .filter(|record| record.outcome == StepOutcome::Completed)
            .map(|record| serde_json::Value::String(record.kind.as_str().to_string()))
            .collect();
        summary.insert("executed_steps".to_string(), serde_json::Value::Array(executed));

        let skipped: Vec<serde_json::Value> = self
            .steps
            .iter()
            .filter(|record| record.outcome.is_skipped())
            .map(|record| serde_json::Value::String(record.kind.as_str().to_string()))
            .collect();
        summary.insert("skipped_steps".to_string(), serde_json::Value::Array(skipped));

        if let Some(failed) = self.steps.iter().find(|record| record.outcome.is_failed()) {
            summary.insert(
                "failed_step".to_string(),
                serde_json::Value::String(failed.kind.as_str().to_string()),
            );
        }

        summary
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_linear_transitions() {
        assert!(RunState::NotStarted.can_transition_to(RunState::Scaffolded));
        assert!(RunState::Scaffolded.can_transition_to(RunState::DependenciesInstalled));
        assert!(RunState::DependenciesInstalled.can_transition_to(RunState::Customized));
        assert!(RunState::Customized.can_transition_to(RunState::Built));

        assert!(!RunState::NotStarted.can_transition_to(RunState::Built));
        assert!(!RunState::Scaffolded.can_transition_to(RunState::Customized));
        assert!(RunState::Customized.can_transition_to(RunState::Failed));
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        assert!(RunState::Built.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Built.valid_next_states().is_empty());
        assert!(RunState::Failed.valid_next_states().is_empty());
    }

    #[test]
    fn test_command_display() {
        let spec = CommandSpec::new("npm")
            .args(["run", "build"])
            .current_dir("next-app");
        assert_eq!(spec.display(), "npm run build (in next-app)");
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["node".to_string(), "customize.js".to_string()];
        let spec = CommandSpec::from_argv(&argv).unwrap();
        assert_eq!(spec.program, "node");
        assert_eq!(spec.args, vec!["customize.js"]);
        assert!(CommandSpec::from_argv(&[]).is_none());
    }

    #[test]
    fn test_combined_tail_keeps_last_lines() {
        let output = CommandOutput {
            exit_code: Some(1),
            stdout: "out1\nout2\n".to_string(),
            stderr: "err1\n\nerr2\n".to_string(),
        };
        assert_eq!(output.combined_tail(2), "out1\nout2");
        assert_eq!(output.combined_tail(10), "err1\nerr2\nout1\nout2");
        assert!(!output.is_success());
    }

    #[test]
    fn test_execution_summary() {
        let report = RunReport {
            site_identifier: "example.com".to_string(),
            project_dir: PathBuf::from("next-app"),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            steps: vec![
                StepRecord {
                    kind: StepKind::Scaffold,
                    outcome: StepOutcome::Skipped {
                        reason: "exists".to_string(),
                    },
                    duration: Duration::from_millis(1),
                },
                StepRecord {
                    kind: StepKind::Install,
                    outcome: StepOutcome::Completed,
                    duration: Duration::from_millis(200),
                },
            ],
            final_state: RunState::DependenciesInstalled,
        };

        let summary = report.execution_summary();
        assert_eq!(
            summary.get("total_duration_ms").unwrap(),
            &serde_json::Value::Number(201.into())
        );
        assert_eq!(
            summary.get("executed_steps").unwrap(),
            &serde_json::json!(["install"])
        );
        assert_eq!(
            summary.get("skipped_steps").unwrap(),
            &serde_json::json!(["scaffold"])
        );

        assert!(summary.get("failed_step").is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["outcome"]["status"], "skipped");
        assert_eq!(json["steps"][1]["duration"], 200);
    }

    #[test]
    fn test_execution_summary_names_failed_step() {
        let report = RunReport {
            site_identifier: "example.com".to_string(),
            project_dir: PathBuf::from("next-app"),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            steps: vec![
                StepRecord {
                    kind: StepKind::Install,
                    outcome: StepOutcome::Completed,
                    duration: Duration::from_millis(5),
                },
                StepRecord {
                    kind: StepKind::Customize,
                    outcome: StepOutcome::Failed {
                        error: "template rendering raised".to_string(),
                    },
                    duration: Duration::from_millis(1),
                },
            ],
            final_state: RunState::Failed,
        };

        let summary = report.execution_summary();
        assert_eq!(summary.get("final_state").unwrap(), "failed");
        assert_eq!(summary.get("failed_step").unwrap(), "customize");
        assert_eq!(
            summary.get("executed_steps").unwrap(),
            &serde_json::json!(["install"])
        );
    }
}
