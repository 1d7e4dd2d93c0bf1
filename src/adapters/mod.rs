// Adapters layer: concrete implementations of the domain ports (processes, dry run, customization).

pub mod customize;
pub mod dry_run;
pub mod process;

use crate::config::BootstrapConfig;
use crate::domain::ports::Customizer;

pub use customize::{CommandCustomizer, NoopCustomizer};
pub use dry_run::DryRunRunner;
pub use process::{OutputMode, ProcessRunner};

/// 依配置選擇自訂步驟的實作
pub fn customizer_for(config: &BootstrapConfig) -> Box<dyn Customizer> {
    match config.customize_spec() {
        Some(spec) => Box::new(CommandCustomizer::new(spec)),
        None => Box::new(NoopCustomizer),
    }
}
