pub mod orchestrator;
pub mod steps;

pub use crate::domain::model::{
    CommandOutput, CommandSpec, RunReport, RunState, StepKind, StepOutcome, StepRecord,
};
pub use crate::domain::ports::{CommandRunner, CustomizeContext, Customizer};
pub use crate::utils::error::Result;
