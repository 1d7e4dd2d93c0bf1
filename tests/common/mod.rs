#![allow(dead_code)]

use async_trait::async_trait;
use site_bootstrap::core::{
    CommandOutput, CommandRunner, CommandSpec, CustomizeContext, Customizer, Result,
};
use site_bootstrap::OrchestrationError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// 依命令內容判斷是哪個步驟
fn label(spec: &CommandSpec) -> String {
    if spec.program == "npx" {
        return "scaffold".to_string();
    }
    match spec.args.as_slice() {
        [arg] if arg == "install" => "install".to_string(),
        [run, build] if run == "run" && build == "build" => "build".to_string(),
        _ => spec.program.clone(),
    }
}

/// 記錄每次調用，並依腳本回傳失敗
pub struct ScriptedRunner {
    log: EventLog,
    failures: HashMap<String, i32>,
    commands: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failures: HashMap::new(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, step: &str, exit_code: i32) -> Self {
        self.failures.insert(step.to_string(), exit_code);
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let step = label(spec);
        self.log.lock().unwrap().push(step.clone());
        self.commands.lock().unwrap().push(spec.clone());

        match self.failures.get(&step) {
            Some(code) => Ok(CommandOutput::failure(*code, format!("{} exploded", step))),
            None => Ok(CommandOutput::success()),
        }
    }
}

pub struct RecordingCustomizer {
    log: EventLog,
    fail: bool,
    seen: Mutex<Vec<CustomizeContext>>,
}

impl RecordingCustomizer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn seen(&self) -> Vec<CustomizeContext> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Customizer for RecordingCustomizer {
    async fn customize(&self, context: &CustomizeContext, _runner: &dyn CommandRunner) -> Result<()> {
        self.log.lock().unwrap().push("customize".to_string());
        self.seen.lock().unwrap().push(context.clone());

        if self.fail {
            return Err(OrchestrationError::CustomizeFailed {
                exit_code: None,
                message: "template rendering raised".to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}
