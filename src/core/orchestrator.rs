use crate::config::{BootstrapConfig, SITE_IDENTIFIER_KEY};
use crate::core::steps::{default_steps, Step, StepContext};
use crate::domain::model::{RunReport, RunState, StepKind, StepOutcome, StepRecord};
use crate::domain::ports::{CommandRunner, Customizer};
use crate::utils::error::{OrchestrationError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// 依序執行腳手架、安裝、自訂、建置；第一個失敗即中止
pub struct Orchestrator {
    config: BootstrapConfig,
    runner: Arc<dyn CommandRunner>,
    customizer: Arc<dyn Customizer>,
    steps: Vec<Box<dyn Step>>,
    monitor: Option<SystemMonitor>,
}

impl Orchestrator {
    pub fn new(
        config: BootstrapConfig,
        runner: Arc<dyn CommandRunner>,
        customizer: Arc<dyn Customizer>,
    ) -> Self {
        Self {
            config,
            runner,
            customizer,
            steps: default_steps(),
            monitor: None,
        }
    }

    /// 啟用或禁用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = if enabled {
            Some(SystemMonitor::new(true))
        } else {
            None
        };
        self
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|step| step.kind()).collect()
    }

    fn log_stats(&self, phase: &str) {
        if let Some(monitor) = &self.monitor {
            monitor.log_stats(phase);
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_report().await.into_result()
    }

    /// 失敗時也產生報告：已完成的步驟、失敗的步驟與 Failed 狀態
    pub async fn run_with_report(&self) -> RunOutcome {
        let started_at = Utc::now();
        let mut records = Vec::with_capacity(self.steps.len());

        let (final_state, error) = match self.execute_steps(&mut records).await {
            Ok(state) => (state, None),
            Err(e) => (RunState::Failed, Some(e)),
        };

        RunOutcome {
            report: RunReport {
                site_identifier: self.config.site_identifier.clone(),
                project_dir: self.config.project_dir(),
                started_at,
                finished_at: Utc::now(),
                steps: records,
                final_state,
            },
            error,
        }
    }

    async fn execute_steps(&self, records: &mut Vec<StepRecord>) -> Result<RunState> {
        if self.config.site_identifier.trim().is_empty() {
            return Err(OrchestrationError::ConfigurationMissing {
                key: SITE_IDENTIFIER_KEY.to_string(),
            });
        }

        tracing::info!(
            "🚀 Setting up site {} in {}",
            self.config.site_identifier,
            self.config.project_dir().display()
        );
        self.log_stats("Orchestration started.");

        let ctx = StepContext {
            config: &self.config,
            runner: self.runner.as_ref(),
            customizer: self.customizer.as_ref(),
        };

        let mut state = RunState::NotStarted;
        let total = self.steps.len();

        for (index, step) in self.steps.iter().enumerate() {
            let kind = step.kind();
            let start_time = Instant::now();
            tracing::info!("▶️ Step {}/{}: {}", index + 1, total, kind);

            match step.execute(&ctx).await {
                Ok(outcome) => {
                    state = advance(state, kind.completed_state())?;

                    let record = StepRecord {
                        kind,
                        outcome,
                        duration: start_time.elapsed(),
                    };
                    tracing::info!(
                        "✅ Step {} finished ({:?}, duration: {:?})",
                        kind,
                        record.outcome,
                        record.duration
                    );
                    records.push(record);
                    self.log_stats(&format!("After {}", kind));
                }
                Err(e) => {
                    records.push(StepRecord {
                        kind,
                        outcome: StepOutcome::Failed {
                            error: e.to_string(),
                        },
                        duration: start_time.elapsed(),
                    });
                    state = advance(state, RunState::Failed)?;
                    tracing::error!("❌ Step {} failed, run is now {}: {}", kind, state, e);
                    return Err(e);
                }
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        tracing::info!("🎉 Site {} is {}", self.config.site_identifier, state);
        Ok(state)
    }
}

/// 一次執行的結果：報告一定存在，失敗時附帶錯誤
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub error: Option<OrchestrationError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<RunReport> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.report),
        }
    }
}

fn advance(current: RunState, next: RunState) -> Result<RunState> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(OrchestrationError::InvalidStateTransition {
            from: current.to_string(),
            to: next.to_string(),
        })
    }
}
