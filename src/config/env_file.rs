use crate::utils::error::{OrchestrationError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// 解析 `.env` 內容：`KEY=VALUE`、`#` 註解、可選的 `export ` 前綴
pub fn parse_env_file(content: &str) -> Result<BTreeMap<String, String>> {
    let re = Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").map_err(
        |e| OrchestrationError::ConfigValidationError {
            field: "env_file".to_string(),
            message: e.to_string(),
        },
    )?;

    let mut vars = BTreeMap::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match re.captures(line) {
            Some(caps) => {
                vars.insert(caps[1].to_string(), unquote(&caps[2]));
            }
            None => {
                tracing::warn!("⚠️ Ignoring malformed .env line: {}", trimmed);
            }
        }
    }

    Ok(vars)
}

fn unquote(raw: &str) -> String {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return raw[1..raw.len() - 1].to_string();
        }
    }

    // 未加引號的值允許行尾註解
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// 載入 `.env` 檔案，檔案不存在時回傳空集合
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No env file at {}", path.display());
        return Ok(BTreeMap::new());
    }

    let content = std::fs::read_to_string(path)?;
    let vars = parse_env_file(&content)?;
    tracing::debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}

/// 環境查詢：真實進程環境優先，`.env` 只補缺
#[derive(Debug, Clone, Default)]
pub struct Environment {
    process: BTreeMap<String, String>,
    dotenv: BTreeMap<String, String>,
}

impl Environment {
    pub fn new<I>(process: I, dotenv: BTreeMap<String, String>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            process: process.into_iter().collect(),
            dotenv,
        }
    }

    pub fn from_process(dotenv: BTreeMap<String, String>) -> Self {
        Self::new(std::env::vars(), dotenv)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.process
            .get(key)
            .or_else(|| self.dotenv.get(key))
            .map(String::as_str)
    }

    /// `.env` 中進程環境未定義的項目，需導出給子進程
    pub fn dotenv_exports(&self) -> BTreeMap<String, String> {
        self.dotenv
            .iter()
            .filter(|(key, _)| !self.process.contains_key(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
