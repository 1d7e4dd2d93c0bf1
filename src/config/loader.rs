use crate::config::env_file::Environment;
use crate::config::toml_config::{has_unresolved_placeholder, TomlConfig};
use crate::config::{BootstrapConfig, SITE_IDENTIFIER_KEY};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;

/// 命令列覆蓋設定
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub site_identifier: Option<String>,
    pub workspace_root: Option<PathBuf>,
    pub project_dir_name: Option<String>,
}

fn usable(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || has_unresolved_placeholder(value) {
        return None;
    }
    Some(value.to_string())
}

/// 依優先順序取得站點識別碼：命令列 > 配置檔 > 環境（含 .env）
pub fn resolve_site_identifier(
    overrides: &ConfigOverrides,
    file: Option<&TomlConfig>,
    env: &Environment,
) -> Result<String> {
    let resolved = usable(overrides.site_identifier.as_deref())
        .or_else(|| usable(file.and_then(|f| f.site.identifier.as_deref())))
        .or_else(|| usable(env.get(SITE_IDENTIFIER_KEY)));

    validation::validate_required_field(SITE_IDENTIFIER_KEY, &resolved).cloned()
}

/// 合併所有來源並驗證，產生 `BootstrapConfig`
pub fn resolve(
    overrides: &ConfigOverrides,
    file: Option<&TomlConfig>,
    env: &Environment,
) -> Result<BootstrapConfig> {
    if let Some(file) = file {
        file.validate()?;
    }

    let site_identifier = resolve_site_identifier(overrides, file, env)?;
    let mut config = BootstrapConfig::new(site_identifier);

    // .env 只補進程環境沒有的變數，配置檔 [environment] 優先
    config.environment = env.dotenv_exports();

    if let Some(file) = file {
        if let Some(root) = &file.project.root {
            config.workspace_root = root.clone();
        }
        if let Some(directory) = &file.project.directory {
            config.project_dir_name = directory.clone();
        }
        config.scaffold = file.scaffold.clone();
        config.package_manager = file.package_manager.clone();
        config.customize_command = file.customize.command.clone();
        config.environment.extend(file.environment.clone());
    }

    if let Some(root) = &overrides.workspace_root {
        config.workspace_root = root.clone();
    }
    if let Some(directory) = &overrides.project_dir_name {
        config.project_dir_name = directory.clone();
    }

    config.validate()?;

    tracing::debug!("Resolved configuration: {:?}", config);
    Ok(config)
}
