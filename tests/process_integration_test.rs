#![cfg(unix)]

use site_bootstrap::adapters::customizer_for;
use site_bootstrap::config::loader::{self, ConfigOverrides};
use site_bootstrap::config::env_file::{load_env_file, Environment};
use site_bootstrap::config::toml_config::TomlConfig;
use site_bootstrap::core::{RunState, StepKind};
use site_bootstrap::{BootstrapConfig, OrchestrationError, Orchestrator, OutputMode, ProcessRunner};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

/// 以 sh 模擬 create-next-app 與 npm
fn shell_config(temp_dir: &TempDir, build_script: &str) -> String {
    let root = temp_dir.path().to_str().unwrap().replace('\\', "/");
    format!(
        r#"
[site]
identifier = "${{TEST_SITE}}"

[project]
root = "{root}"

[scaffold]
generator = ["sh", "-c", "mkdir \"$0\" && echo \"$@\" > \"$0/scaffold-args\""]

[package_manager]
program = "sh"
install_args = ["-c", "touch installed"]
build_args = ["-c", "{build_script}"]

[customize]
command = ["sh", "-c", "echo \"$DOMAIN_NAME\" > site.txt"]

[environment]
NEXT_TELEMETRY_DISABLED = "1"
"#
    )
}

fn resolve(toml: &str) -> BootstrapConfig {
    let env = Environment::new(
        vec![("TEST_SITE".to_string(), "example.com".to_string())],
        BTreeMap::new(),
    );
    let file = TomlConfig::from_toml_str(toml, &env).unwrap();
    loader::resolve(&ConfigOverrides::default(), Some(&file), &env).unwrap()
}

fn orchestrator(config: BootstrapConfig) -> Orchestrator {
    let customizer = Arc::from(customizer_for(&config));
    Orchestrator::new(
        config,
        Arc::new(ProcessRunner::new(OutputMode::Capture)),
        customizer,
    )
}

#[tokio::test]
async fn test_end_to_end_with_real_processes() {
    let temp_dir = TempDir::new().unwrap();
    let config = resolve(&shell_config(&temp_dir, "test -f installed && touch built"));

    let report = orchestrator(config).run().await.unwrap();
    assert_eq!(report.final_state, RunState::Built);

    let project_dir = temp_dir.path().join("next-app");
    assert!(project_dir.join("installed").exists());
    assert!(project_dir.join("built").exists());

    let site = std::fs::read_to_string(project_dir.join("site.txt")).unwrap();
    assert_eq!(site.trim(), "example.com");

    let scaffold_args = std::fs::read_to_string(project_dir.join("scaffold-args")).unwrap();
    assert!(scaffold_args.contains("--typescript"));
    assert!(scaffold_args.contains("--import-alias @/*"));
    assert!(scaffold_args.contains("--use-npm"));
}

#[tokio::test]
async fn test_second_run_reuses_scaffold() {
    let temp_dir = TempDir::new().unwrap();
    let toml = shell_config(&temp_dir, "touch built");

    orchestrator(resolve(&toml)).run().await.unwrap();
    let marker = temp_dir.path().join("next-app").join("user-file");
    std::fs::write(&marker, "keep me").unwrap();

    let report = orchestrator(resolve(&toml)).run().await.unwrap();
    assert!(report.step(StepKind::Scaffold).unwrap().outcome.is_skipped());
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "keep me");
}

#[tokio::test]
async fn test_build_exit_code_is_propagated() {
    let temp_dir = TempDir::new().unwrap();
    let config = resolve(&shell_config(&temp_dir, "echo compile error >&2; exit 5"));

    let err = orchestrator(config).run().await.unwrap_err();
    match &err {
        OrchestrationError::BuildFailed { exit_code, details } => {
            assert_eq!(*exit_code, Some(5));
            assert!(details.contains("compile error"));
        }
        other => panic!("expected BuildFailed, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn test_dotenv_variables_reach_build() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join(".env");
    std::fs::write(
        &env_path,
        "DOMAIN_NAME=example.com\nNEXT_PUBLIC_API=https://api.example.com\n",
    )
    .unwrap();

    let toml = shell_config(
        &temp_dir,
        "echo \\\"api=$NEXT_PUBLIC_API domain=$DOMAIN_NAME\\\" > built",
    );
    let env = Environment::new(Vec::new(), load_env_file(&env_path).unwrap());
    let file = TomlConfig::from_toml_str(&toml, &env).unwrap();
    let config = loader::resolve(&ConfigOverrides::default(), Some(&file), &env).unwrap();
    assert_eq!(config.site_identifier, "example.com");

    orchestrator(config).run().await.unwrap();

    let built = std::fs::read_to_string(temp_dir.path().join("next-app").join("built")).unwrap();
    assert_eq!(built.trim(), "api=https://api.example.com domain=example.com");
}
