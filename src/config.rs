//! Environment-driven settings.
//!
//! Values come from the process environment, which `main` first fills from a
//! `.env` file through `dotenv`. Command-line flags override them.

use colored::Colorize;
use thiserror::Error;

use crate::export::ExportOptions;
use crate::models::AddressRangeVariant;
use crate::parser::parse_all;
use crate::processing::{parse_steps, AggregationMode, AggregationPolicy, PolicyError};

pub const MODE_VAR: &str = "CIDR_MERGER_MODE";
pub const POLICY_VAR: &str = "CIDR_MERGER_POLICY";
pub const EXCLUDE_PRIVATE_VAR: &str = "CIDR_MERGER_EXCLUDE_PRIVATE";
pub const EXCLUDE_VAR: &str = "CIDR_MERGER_EXCLUDE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    Policy {
        var: &'static str,
        #[source]
        source: PolicyError,
    },
    #[error("{var}: expected true or false, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Export settings before validation into a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: AggregationMode,
    /// Custom steps; the mode's built-in steps when `None`.
    pub policy: Option<String>,
    pub exclude_private: bool,
    pub exclude: Vec<AddressRangeVariant>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: AggregationMode::Cascading,
            policy: None,
            exclude_private: true,
            exclude: Vec::new(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(mode) = lookup(MODE_VAR) {
            settings.mode = mode.parse().map_err(|source| ConfigError::Policy {
                var: MODE_VAR,
                source,
            })?;
        }
        if let Some(policy) = lookup(POLICY_VAR).filter(|p| !p.trim().is_empty()) {
            // Surface bad step syntax at load time rather than at first export.
            parse_steps(&policy).map_err(|source| ConfigError::Policy {
                var: POLICY_VAR,
                source,
            })?;
            settings.policy = Some(policy);
        }
        if let Some(value) = lookup(EXCLUDE_PRIVATE_VAR) {
            settings.exclude_private = parse_bool(EXCLUDE_PRIVATE_VAR, &value)?;
        }
        if let Some(exclude) = lookup(EXCLUDE_VAR) {
            settings.exclude = parse_all([exclude]);
        }

        log::debug!(
            "Settings: mode={} policy={} exclude_private={} exclude={}",
            settings.mode.to_string().on_blue(),
            settings.policy.as_deref().unwrap_or("default"),
            settings.exclude_private,
            settings.exclude.len()
        );
        Ok(settings)
    }

    /// Build the aggregation policy these settings describe.
    pub fn policy(&self) -> Result<AggregationPolicy, ConfigError> {
        let policy_error = |source| ConfigError::Policy {
            var: POLICY_VAR,
            source,
        };
        match &self.policy {
            Some(text) => {
                let steps = parse_steps(text).map_err(policy_error)?;
                AggregationPolicy::new(self.mode, steps).map_err(policy_error)
            }
            None => Ok(AggregationPolicy::default_for(self.mode)),
        }
    }

    pub fn export_options(&self) -> Result<ExportOptions, ConfigError> {
        Ok(ExportOptions {
            policy: self.policy()?,
            exclude_private: self.exclude_private,
            exclude: self.exclude.clone(),
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::AggregationStep;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.policy().unwrap(), AggregationPolicy::cascading_default());
        assert!(s.export_options().unwrap().exclude_private);
    }

    #[test]
    fn test_custom_policy() {
        let s = settings(&[(MODE_VAR, "independent"), (POLICY_VAR, "16:10, 24:2")]).unwrap();
        let policy = s.policy().unwrap();
        assert_eq!(policy.mode(), AggregationMode::Independent);
        assert_eq!(
            policy.steps(),
            &[AggregationStep::new(16, 10), AggregationStep::new(24, 2)]
        );
    }

    #[test]
    fn test_mode_without_policy_uses_builtin_steps() {
        let s = settings(&[(MODE_VAR, "independent")]).unwrap();
        assert_eq!(s.policy().unwrap(), AggregationPolicy::independent_default());
    }

    #[test]
    fn test_cascading_policy_must_decrease() {
        let s = settings(&[(POLICY_VAR, "16:1,24:1")]).unwrap();
        let err = s.policy().unwrap_err();
        assert_eq!(
            err.to_string(),
            "CIDR_MERGER_POLICY: cascading prefix lengths must decrease, got /16 then /24"
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings(&[(MODE_VAR, "sideways")]),
            Err(ConfigError::Policy { var: MODE_VAR, .. })
        ));
        assert!(matches!(
            settings(&[(POLICY_VAR, "16")]),
            Err(ConfigError::Policy { var: POLICY_VAR, .. })
        ));
        assert!(matches!(
            settings(&[(EXCLUDE_PRIVATE_VAR, "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn test_exclusions_and_private_flag() {
        let s = settings(&[
            (EXCLUDE_PRIVATE_VAR, "off"),
            (EXCLUDE_VAR, "1.2.3.0/24, junk, 5.5.5.5"),
        ])
        .unwrap();
        assert!(!s.exclude_private);
        let texts: Vec<String> = s.exclude.iter().map(|v| v.to_string()).collect();
        assert_eq!(texts, vec!["1.2.3.0/24", "5.5.5.5"]);
    }
}
