//! Container options.
//!
//! Options are plain values set through [`ContainerBuilder`](crate::ContainerBuilder),
//! read from the environment with [`ContainerOptions::from_env`], or, with the
//! `config` feature, deserialized from JSON.

use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default upper bound on nested resolutions per thread.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

const ENV_PREFIX: &str = "BEAN_IOC";

/// What the singleton cache keeps when two threads build the same cold singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum SingletonPolicy {
    /// The later write replaces the earlier one; callers that lost the race
    /// keep the instance they built.
    #[default]
    LastWriteWins,
    /// The earlier write is kept and every caller receives it.
    FirstWriteWins,
}

impl FromStr for SingletonPolicy {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" | "last" => Ok(SingletonPolicy::LastWriteWins),
            "first-write-wins" | "first" => Ok(SingletonPolicy::FirstWriteWins),
            _ => Err(OptionsError::invalid("singleton_policy", s)),
        }
    }
}

/// Tuning knobs for a [`Container`](crate::Container).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Singleton race policy
    pub singleton_policy: SingletonPolicy,
    /// Maximum nested resolutions on one thread
    pub max_depth: usize,
    /// Emit provider conflict reports
    pub report_conflicts: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            singleton_policy: SingletonPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            report_conflicts: true,
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_singleton_policy(mut self, policy: SingletonPolicy) -> Self {
        self.singleton_policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_report_conflicts(mut self, enabled: bool) -> Self {
        self.report_conflicts = enabled;
        self
    }

    /// Defaults overridden by `BEAN_IOC_*` environment variables.
    ///
    /// Recognized: `BEAN_IOC_SINGLETON_POLICY`, `BEAN_IOC_MAX_DEPTH`,
    /// `BEAN_IOC_REPORT_CONFLICTS`. Unset variables keep their default.
    pub fn from_env() -> Result<Self, OptionsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OptionsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            let name = format!("{}_{}", ENV_PREFIX, key.to_uppercase());
            lookup(name.as_str())
        };
        let mut options = Self::default();

        if let Some(value) = var("singleton_policy") {
            options.singleton_policy = value.parse()?;
        }
        if let Some(value) = var("max_depth") {
            options.max_depth = value
                .trim()
                .parse()
                .map_err(|_| OptionsError::invalid("max_depth", &value))?;
        }
        if let Some(value) = var("report_conflicts") {
            options.report_conflicts = parse_bool(&value)
                .ok_or_else(|| OptionsError::invalid("report_conflicts", &value))?;
        }

        Ok(options)
    }

    /// Parses options from a JSON document; missing fields keep their default.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError {
            option: "json",
            value: e.to_string(),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// An option value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsError {
    pub option: &'static str,
    pub value: String,
}

impl OptionsError {
    fn invalid(option: &'static str, value: &str) -> Self {
        Self { option, value: value.to_string() }
    }
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid value for {}: {}", self.option, self.value)
    }
}

impl std::error::Error for OptionsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let options = ContainerOptions::default();
        assert_eq!(options.singleton_policy, SingletonPolicy::LastWriteWins);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.report_conflicts);
    }

    #[test]
    fn lookup_overrides_every_option() {
        let options = ContainerOptions::from_lookup(lookup(&[
            ("BEAN_IOC_SINGLETON_POLICY", "first-write-wins"),
            ("BEAN_IOC_MAX_DEPTH", "32"),
            ("BEAN_IOC_REPORT_CONFLICTS", "off"),
        ]))
        .unwrap();

        assert_eq!(options.singleton_policy, SingletonPolicy::FirstWriteWins);
        assert_eq!(options.max_depth, 32);
        assert!(!options.report_conflicts);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ContainerOptions::from_lookup(lookup(&[("BEAN_IOC_MAX_DEPTH", "deep")])).unwrap_err();
        assert_eq!(err.option, "max_depth");
        assert_eq!(err.to_string(), "Invalid value for max_depth: deep");

        assert!("sometimes".parse::<SingletonPolicy>().is_err());
    }

    #[test]
    fn builder_setters() {
        let options = ContainerOptions::new()
            .with_max_depth(8)
            .with_singleton_policy(SingletonPolicy::FirstWriteWins)
            .with_report_conflicts(false);
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.singleton_policy, SingletonPolicy::FirstWriteWins);
        assert!(!options.report_conflicts);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip_keeps_defaults_for_missing_fields() {
        let options = ContainerOptions::from_json(r#"{ "singleton_policy": "first-write-wins" }"#).unwrap();
        assert_eq!(options.singleton_policy, SingletonPolicy::FirstWriteWins);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);

        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("first-write-wins"));
    }
}
