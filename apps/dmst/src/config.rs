use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use selection_engine::EngineConfig;
use serde::Deserialize;
use shared::domain::{
    NonValue, NonValuePlacement, OptionEntry, OptionOrder, OptionPool, OptionValue, ValueOrdering,
};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub distinct_options: bool,
    pub non_value: NonValue,
    pub option_order: OptionOrder,
    pub value_ordering: ValueOrdering,
    pub non_value_placement: NonValuePlacement,
    pub pool_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distinct_options: true,
            non_value: NonValue::default(),
            option_order: OptionOrder::ByValue,
            value_ordering: ValueOrdering::Natural,
            non_value_placement: NonValuePlacement::Pinned,
            pool_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn engine_config(&self, pool: OptionPool) -> EngineConfig {
        EngineConfig::new(pool)
            .with_distinct_options(self.distinct_options)
            .with_non_value(self.non_value.clone())
            .with_option_order(self.option_order)
            .with_value_ordering(self.value_ordering)
            .with_non_value_placement(self.non_value_placement)
    }
}

/// Defaults, then the TOML file at `path` (if present), then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |names: &[&str]| names.iter().rev().find_map(|&name| lookup(name));

    if let Some(v) = var(&["DMST_DISTINCT_OPTIONS", "APP__DISTINCT_OPTIONS"]) {
        if let Some(parsed) = parse_flag(&v) {
            settings.distinct_options = parsed;
        }
    }
    if let Some(v) = var(&["DMST_NON_VALUE_LABEL", "APP__NON_VALUE_LABEL"]) {
        settings.non_value.label = v;
    }
    if let Some(v) = var(&["DMST_NON_VALUE", "APP__NON_VALUE"]) {
        settings.non_value.value = OptionValue::from(v);
    }
    if let Some(v) = var(&["DMST_POOL", "APP__POOL"]) {
        settings.pool_path = Some(PathBuf::from(v));
    }
    if let Some(v) = var(&["DMST_LOG", "APP__LOG"]) {
        settings.log_filter = v;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reads a pool from JSON (`{"Label": value}` or `[{"label", "value"}]`) or
/// TOML (`Label = value`). Key order is kept.
pub fn load_pool(path: &Path) -> anyhow::Result<OptionPool> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read pool file '{}'", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        parse_toml_pool(&raw).with_context(|| format!("invalid TOML pool '{}'", path.display()))
    } else {
        parse_json_pool(&raw).with_context(|| format!("invalid JSON pool '{}'", path.display()))
    }
}

fn parse_json_pool(raw: &str) -> anyhow::Result<OptionPool> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(label, value)| -> anyhow::Result<OptionEntry> {
                Ok(OptionEntry::new(label, json_token(&value)?))
            })
            .collect(),
        serde_json::Value::Array(items) => Ok(serde_json::from_value::<OptionPool>(
            serde_json::Value::Array(items),
        )?),
        other => bail!("expected an object or array, found {other}"),
    }
}

fn json_token(value: &serde_json::Value) -> anyhow::Result<OptionValue> {
    match value {
        serde_json::Value::String(s) => Ok(OptionValue::from(s.as_str())),
        serde_json::Value::Number(n) => Ok(OptionValue::from(n.to_string())),
        serde_json::Value::Bool(b) => Ok(OptionValue::from(b.to_string())),
        other => bail!("option values must be scalars, found {other}"),
    }
}

fn parse_toml_pool(raw: &str) -> anyhow::Result<OptionPool> {
    let table: toml::Table = toml::from_str(raw)?;
    table
        .into_iter()
        .map(|(label, value)| -> anyhow::Result<OptionEntry> {
            let token = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => bail!("option '{label}' must be a scalar, found {other}"),
            };
            Ok(OptionEntry::new(label, token))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
