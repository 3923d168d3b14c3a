use std::{fs, path::Path};

use anyhow::Context;
use sequence::clock::DEFAULT_YEAR_SPAN;

pub const DEFAULT_CONFIG_FILE: &str = "knob.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub start_year: Option<i32>,
    pub year_span: i32,
    pub log_filter: String,
    pub input_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_year: None,
            year_span: DEFAULT_YEAR_SPAN,
            log_filter: "info".into(),
            input_queue_capacity: 64,
        }
    }
}

/// Defaults, then the config file, then environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, lookup);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;

    if let Some(v) = table.get("start_year").and_then(integer) {
        if let Ok(year) = i32::try_from(v) {
            settings.start_year = Some(year);
        }
    }
    if let Some(v) = table.get("year_span").and_then(integer) {
        if let Ok(span) = i32::try_from(v) {
            settings.year_span = span;
        }
    }
    if let Some(v) = table.get("log_filter").and_then(toml::Value::as_str) {
        settings.log_filter = v.to_string();
    }
    if let Some(v) = table.get("input_queue_capacity").and_then(integer) {
        if let Ok(capacity) = usize::try_from(v) {
            settings.input_queue_capacity = capacity;
        }
    }

    Ok(())
}

// Accepts `start_year = 2024` as well as `start_year = "2024"`.
fn integer(value: &toml::Value) -> Option<i64> {
    match value {
        toml::Value::Integer(v) => Some(*v),
        toml::Value::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["KNOB_START_YEAR", "APP__START_YEAR"] {
        if let Some(year) = lookup(key).and_then(|v| v.trim().parse().ok()) {
            settings.start_year = Some(year);
        }
    }

    if let Some(span) = lookup("APP__YEAR_SPAN").and_then(|v| v.trim().parse().ok()) {
        settings.year_span = span;
    }

    for key in ["RUST_LOG", "APP__LOG_FILTER"] {
        if let Some(filter) = lookup(key).filter(|v| !v.trim().is_empty()) {
            settings.log_filter = filter;
        }
    }

    let capacity = lookup("APP__INPUT_QUEUE_CAPACITY").and_then(|v| v.trim().parse().ok());
    if let Some(capacity) = capacity {
        settings.input_queue_capacity = capacity;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
