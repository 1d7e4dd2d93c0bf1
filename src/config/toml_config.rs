use crate::config::env_file::Environment;
use crate::config::{PackageManagerConfig, ScaffoldOptions};
use crate::utils::error::{OrchestrationError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub site: SiteSection,
    pub project: ProjectSection,
    pub scaffold: ScaffoldOptions,
    pub package_manager: PackageManagerConfig,
    pub customize: CustomizeSection,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub root: Option<PathBuf>,
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizeSection {
    pub command: Option<Vec<String>>,
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrchestrationError::ConfigValidationError {
        field: "toml_parsing".to_string(),
        message: e.to_string(),
    })
}

/// 是否仍含未替換的 `${VAR}`
pub fn has_unresolved_placeholder(value: &str) -> bool {
    placeholder_regex()
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// 轉義成 TOML 基本字串內容，避免值中的引號或反斜線破壞解析
fn escape_basic_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P, env: &Environment) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrchestrationError::IoError)?;
        Self::from_toml_str(&content, env)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str, env: &Environment) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content, env)?;

        toml::from_str(&processed_content).map_err(|e| OrchestrationError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DOMAIN_NAME})，找不到的保留原樣
    fn substitute_env_vars(content: &str, env: &Environment) -> Result<String> {
        let re = placeholder_regex()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env.get(var_name)
                .map(escape_basic_string)
                .unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(root) = &self.project.root {
            validation::validate_path("project.root", &root.to_string_lossy())?;
        }
        if let Some(directory) = &self.project.directory {
            validation::validate_directory_name("project.directory", directory)?;
        }
        validation::validate_command("scaffold.generator", &self.scaffold.generator)?;
        validation::validate_non_empty_string(
            "package_manager.program",
            &self.package_manager.program,
        )?;
        if let Some(command) = &self.customize.command {
            validation::validate_command("customize.command", command)?;
        }
        Ok(())
    }
}
