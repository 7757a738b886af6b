// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment
//!
//! Call `dotenv().ok()` before [`Settings::from_env`] to pick up a `.env`
//! file.

use std::path::PathBuf;

use crate::engine::{EngineOptions, DEFAULT_MAX_STEPS};
use crate::error::GuidelineError;

pub const MAX_STEPS_VAR: &str = "GUIDELINE_MAX_STEPS";
pub const GUIDELINES_DIR_VAR: &str = "GUIDELINES_DIR";
pub const PORT_VAR: &str = "GUIDELINE_PORT";

pub const DEFAULT_GUIDELINES_DIR: &str = "guidelines";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Traversal hop ceiling
    pub max_steps: usize,
    /// Directory served by the HTTP surface
    pub guidelines_dir: PathBuf,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            guidelines_dir: PathBuf::from(DEFAULT_GUIDELINES_DIR),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, GuidelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GuidelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(raw) = lookup(MAX_STEPS_VAR) {
            let steps: usize = raw.trim().parse().map_err(|_| {
                GuidelineError::config(format!(
                    "{} must be a positive integer, got '{}'",
                    MAX_STEPS_VAR, raw
                ))
            })?;
            if steps == 0 {
                return Err(GuidelineError::config(format!(
                    "{} must be at least 1",
                    MAX_STEPS_VAR
                )));
            }
            settings.max_steps = steps;
        }

        if let Some(dir) = lookup(GUIDELINES_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            settings.guidelines_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(PORT_VAR) {
            settings.port = raw.trim().parse().map_err(|_| {
                GuidelineError::config(format!(
                    "{} must be a port number, got '{}'",
                    PORT_VAR, raw
                ))
            })?;
        }

        Ok(settings)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            max_steps: self.max_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine_options(), EngineOptions::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            (MAX_STEPS_VAR, "50"),
            (GUIDELINES_DIR_VAR, "/srv/guidelines"),
            (PORT_VAR, "8080"),
        ]))
        .unwrap();

        assert_eq!(settings.max_steps, 50);
        assert_eq!(settings.guidelines_dir, PathBuf::from("/srv/guidelines"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.engine_options().max_steps, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Settings::from_lookup(lookup_from(&[(MAX_STEPS_VAR, "many")])),
            Err(GuidelineError::Config(_))
        ));
        assert!(matches!(
            Settings::from_lookup(lookup_from(&[(MAX_STEPS_VAR, "0")])),
            Err(GuidelineError::Config(_))
        ));
        assert!(matches!(
            Settings::from_lookup(lookup_from(&[(PORT_VAR, "70000")])),
            Err(GuidelineError::Config(_))
        ));
    }
}
