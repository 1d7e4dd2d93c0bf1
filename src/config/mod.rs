#[cfg(feature = "cli")]
pub mod cli;
pub mod env_file;
pub mod loader;
pub mod toml_config;

use crate::domain::model::CommandSpec;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 站點識別碼所在的環境變數
pub const SITE_IDENTIFIER_KEY: &str = "DOMAIN_NAME";

/// 導出給自訂命令的專案目錄變數
pub const PROJECT_DIR_KEY: &str = "SITE_PROJECT_DIR";

pub const DEFAULT_PROJECT_DIR: &str = "next-app";

pub const DEFAULT_ENV_FILE: &str = ".env";

/// 腳手架產生器的固定選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldOptions {
    pub generator: Vec<String>,
    pub typescript: bool,
    pub tailwind: bool,
    pub eslint: bool,
    pub app_router: bool,
    pub src_dir: bool,
    pub import_alias: String,
    pub package_manager: String,
    pub non_interactive: bool,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        Self {
            generator: vec![
                "npx".to_string(),
                "--yes".to_string(),
                "create-next-app@latest".to_string(),
            ],
            typescript: true,
            tailwind: true,
            eslint: true,
            app_router: true,
            src_dir: true,
            import_alias: "@/*".to_string(),
            package_manager: "npm".to_string(),
            non_interactive: true,
        }
    }
}

impl ScaffoldOptions {
    /// 產生器之後的參數：目錄名稱加上選項旗標
    pub fn to_args(&self, project_dir_name: &str) -> Vec<String> {
        let mut args = vec![project_dir_name.to_string()];

        if self.typescript {
            args.push("--typescript".to_string());
        }
        if self.tailwind {
            args.push("--tailwind".to_string());
        }
        if self.eslint {
            args.push("--eslint".to_string());
        }
        if self.app_router {
            args.push("--app".to_string());
        }
        if self.src_dir {
            args.push("--src-dir".to_string());
        }
        if !self.import_alias.is_empty() {
            args.push("--import-alias".to_string());
            args.push(self.import_alias.clone());
        }
        if !self.package_manager.is_empty() {
            args.push(format!("--use-{}", self.package_manager));
        }
        if self.non_interactive {
            args.push("--yes".to_string());
        }

        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    pub program: String,
    pub install_args: Vec<String>,
    pub build_args: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            program: "npm".to_string(),
            install_args: vec!["install".to_string()],
            build_args: vec!["run".to_string(), "build".to_string()],
        }
    }
}

/// 編排器的完整配置，在進程啟動時一次性建立
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub site_identifier: String,
    pub workspace_root: PathBuf,
    pub project_dir_name: String,
    pub scaffold: ScaffoldOptions,
    pub package_manager: PackageManagerConfig,
    pub customize_command: Option<Vec<String>>,
    /// 傳給每個子進程的額外環境變數
    pub environment: BTreeMap<String, String>,
}

impl BootstrapConfig {
    pub fn new(site_identifier: impl Into<String>) -> Self {
        Self {
            site_identifier: site_identifier.into(),
            workspace_root: PathBuf::from("."),
            project_dir_name: DEFAULT_PROJECT_DIR.to_string(),
            scaffold: ScaffoldOptions::default(),
            package_manager: PackageManagerConfig::default(),
            customize_command: None,
            environment: BTreeMap::new(),
        }
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_project_dir_name(mut self, name: impl Into<String>) -> Self {
        self.project_dir_name = name.into();
        self
    }

    pub fn with_customize_command(mut self, command: Vec<String>) -> Self {
        self.customize_command = Some(command);
        self
    }

    pub fn project_dir(&self) -> PathBuf {
        self.workspace_root.join(&self.project_dir_name)
    }

    fn extra_env(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// 站點識別碼刻意不傳入腳手架參數
    pub fn scaffold_command(&self) -> Option<CommandSpec> {
        let spec = CommandSpec::from_argv(&self.scaffold.generator)?;
        Some(
            spec.args(self.scaffold.to_args(&self.project_dir_name))
                .current_dir(self.workspace_root.clone())
                .envs(self.extra_env()),
        )
    }

    pub fn install_command(&self) -> CommandSpec {
        CommandSpec::new(self.package_manager.program.clone())
            .args(self.package_manager.install_args.iter().cloned())
            .current_dir(self.project_dir())
            .envs(self.extra_env())
    }

    pub fn build_command(&self) -> CommandSpec {
        CommandSpec::new(self.package_manager.program.clone())
            .args(self.package_manager.build_args.iter().cloned())
            .current_dir(self.project_dir())
            .envs(self.extra_env())
    }

    pub fn customize_spec(&self) -> Option<CommandSpec> {
        let command = self.customize_command.as_ref()?;
        let spec = CommandSpec::from_argv(command)?;
        Some(
            spec.current_dir(self.project_dir())
                .envs(self.extra_env())
                .env(SITE_IDENTIFIER_KEY, self.site_identifier.clone())
                .env(PROJECT_DIR_KEY, self.project_dir().display().to_string()),
        )
    }
}

impl Validate for BootstrapConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path(
            "project.root",
            &self.workspace_root.to_string_lossy(),
        )?;
        validation::validate_directory_name("project.directory", &self.project_dir_name)?;
        validation::validate_command("scaffold.generator", &self.scaffold.generator)?;
        validation::validate_non_empty_string(
            "package_manager.program",
            &self.package_manager.program,
        )?;
        if let Some(command) = &self.customize_command {
            validation::validate_command("customize.command", command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scaffold_command() {
        let config = BootstrapConfig::new("example.com");
        let spec = config.scaffold_command().unwrap();

        assert_eq!(spec.program, "npx");
        assert_eq!(
            spec.args,
            vec![
                "--yes",
                "create-next-app@latest",
                "next-app",
                "--typescript",
                "--tailwind",
                "--eslint",
                "--app",
                "--src-dir",
                "--import-alias",
                "@/*",
                "--use-npm",
                "--yes",
            ]
        );
        assert_eq!(spec.working_dir, Some(PathBuf::from(".")));
        assert!(!spec.args.iter().any(|arg| arg.contains("example.com")));
    }

    #[test]
    fn test_install_and_build_run_in_project_dir() {
        let config = BootstrapConfig::new("example.com").with_workspace_root("/work");

        let install = config.install_command();
        assert_eq!(install.program, "npm");
        assert_eq!(install.args, vec!["install"]);
        assert_eq!(install.working_dir, Some(PathBuf::from("/work/next-app")));

        let build = config.build_command();
        assert_eq!(build.args, vec!["run", "build"]);
        assert_eq!(build.working_dir, Some(PathBuf::from("/work/next-app")));
    }

    #[test]
    fn test_customize_spec_exports_site_identifier() {
        let config = BootstrapConfig::new("example.com")
            .with_customize_command(vec!["node".to_string(), "customize.js".to_string()]);

        let spec = config.customize_spec().unwrap();
        assert!(spec
            .env
            .contains(&(SITE_IDENTIFIER_KEY.to_string(), "example.com".to_string())));
        assert_eq!(spec.working_dir, Some(PathBuf::from("./next-app")));

        assert!(BootstrapConfig::new("example.com").customize_spec().is_none());
    }

    #[test]
    fn test_disabled_flags_are_omitted() {
        let options = ScaffoldOptions {
            tailwind: false,
            eslint: false,
            import_alias: String::new(),
            ..ScaffoldOptions::default()
        };
        let args = options.to_args("app");
        assert!(!args.contains(&"--tailwind".to_string()));
        assert!(!args.contains(&"--import-alias".to_string()));
        assert!(args.contains(&"--typescript".to_string()));
    }

    #[test]
    fn test_validate_rejects_nested_project_dir() {
        let config = BootstrapConfig::new("example.com").with_project_dir_name("a/b");
        assert!(config.validate().is_err());
        assert!(BootstrapConfig::new("example.com").validate().is_ok());
    }
}
