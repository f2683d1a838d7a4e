use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::page::{Form, Page};
use crate::scan_buffer::{DEFAULT_GAP_THRESHOLD_MS, DEFAULT_IDLE_RESET_MS, ScanTimings};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILE: &str = "tillscan.log";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where the till serves its pages and API
    pub base_url: String,
    pub gap_threshold_ms: u64,
    pub idle_reset_ms: u64,
    /// Whether the till page loads its AJAX helper (htmx)
    pub ajax: bool,
    pub log_file: String,
    /// Forms on the till page the listener can submit
    pub forms: Vec<Form>,

    #[serde(skip)]
    file_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            gap_threshold_ms: DEFAULT_GAP_THRESHOLD_MS,
            idle_reset_ms: DEFAULT_IDLE_RESET_MS,
            ajax: true,
            log_file: DEFAULT_LOG_FILE.to_string(),
            forms: vec![Form::scan_form()],
            file_path: None,
        }
    }
}

impl Settings {
    pub fn with_file(file_path: &str) -> Self {
        Self {
            file_path: Some(file_path.to_string()),
            ..Self::default()
        }
    }

    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load settings from {path}: {e}");
                Self::with_file(path)
            }),
            None => Self::default(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;

            match serde_json::from_str::<Self>(&content) {
                Ok(mut settings) => {
                    settings.file_path = Some(file_path.to_string());
                    Ok(settings)
                }
                Err(e) => {
                    log::error!("Failed to parse settings file: {e}");
                    Err(anyhow::anyhow!("Failed to parse settings: {}", e))
                }
            }
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Applies `UT_*` environment overrides on top of the file values
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("UT_SCAN_BASE_URL") {
            self.base_url = url.trim().to_string();
        } else if let Some(addr) = non_empty("UT_LISTEN_ADDR") {
            self.base_url = base_url_from_listen_addr(addr.trim());
        }

        if let Some(ms) = non_empty("UT_SCAN_GAP_MS") {
            match ms.trim().parse() {
                Ok(ms) => self.gap_threshold_ms = ms,
                Err(e) => log::warn!("Ignoring UT_SCAN_GAP_MS={ms:?}: {e}"),
            }
        }
        if let Some(ms) = non_empty("UT_SCAN_IDLE_MS") {
            match ms.trim().parse() {
                Ok(ms) => self.idle_reset_ms = ms,
                Err(e) => log::warn!("Ignoring UT_SCAN_IDLE_MS={ms:?}: {e}"),
            }
        }
        if let Some(ajax) = non_empty("UT_SCAN_AJAX") {
            self.ajax = ajax.trim().eq_ignore_ascii_case("true");
        }
    }

    pub fn timings(&self) -> ScanTimings {
        ScanTimings {
            gap_threshold: Duration::from_millis(self.gap_threshold_ms),
            idle_reset: Duration::from_millis(self.idle_reset_ms),
        }
    }

    pub fn page(&self) -> Page {
        Page::new(self.forms.clone())
    }
}

/// `:8080` binds every interface; the listener reaches it through localhost
fn base_url_from_listen_addr(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        return addr.trim_end_matches('/').to_string();
    }
    match addr.strip_prefix(':') {
        Some(port) => format!("http://localhost:{port}"),
        None => format!("http://{addr}"),
    }
}
