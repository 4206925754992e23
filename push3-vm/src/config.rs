use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::entropy::ContextEntropy;

pub const DEFAULT_STACK_HEADROOM: usize = 256;

/// Execution settings, usually read from a `vm.toml`.
///
/// ```toml
/// stack_headroom = 256
/// seed = 7
/// caller = "node-a"
/// step_budget = 100000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Extra slots each stack gets on top of its initial contents.
    pub stack_headroom: usize,
    /// Entropy seed for the `RAND` opcodes.
    pub seed: u64,
    /// Caller identity mixed into the entropy stream.
    pub caller: String,
    /// Upper bound on executed descriptors. Unbounded when absent.
    pub step_budget: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_headroom: DEFAULT_STACK_HEADROOM,
            seed: 0,
            caller: String::new(),
            step_budget: None,
        }
    }
}

impl VmConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse vm config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize vm config")
    }

    /// Fresh entropy source for one run.
    pub fn entropy(&self) -> ContextEntropy {
        ContextEntropy::new(self.seed).with_caller(self.caller.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = VmConfig::from_toml_str("seed = 9").unwrap();
        assert_eq!(
            cfg,
            VmConfig {
                seed: 9,
                ..Default::default()
            }
        );
        assert_eq!(cfg.stack_headroom, 256);
        assert_eq!(cfg.step_budget, None);
    }

    #[test]
    fn full_config() {
        let text = r#"
            stack_headroom = 32
            seed = 7
            caller = "node-a"
            step_budget = 1000
        "#;
        let cfg = VmConfig::from_toml_str(text).unwrap();
        assert_eq!(cfg.stack_headroom, 32);
        assert_eq!(cfg.caller, "node-a");
        assert_eq!(cfg.step_budget, Some(1000));

        let again = VmConfig::from_toml_str(&cfg.to_toml_string().unwrap()).unwrap();
        assert_eq!(again, cfg);
    }

    #[test]
    fn bad_types_are_reported() {
        assert!(VmConfig::from_toml_str("stack_headroom = \"lots\"").is_err());
    }

    #[test]
    fn entropy_follows_seed_and_caller() {
        use crate::entropy::Entropy;

        let a = VmConfig {
            seed: 3,
            caller: "x".into(),
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(a.entropy().next_word(), b.entropy().next_word());
        assert_ne!(
            a.entropy().next_word(),
            VmConfig::default().entropy().next_word()
        );
    }
}
