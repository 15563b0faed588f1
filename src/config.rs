use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    GRAVITY, RECONCILIATION_TOLERANCE, SPECIFIC_GAS_CONSTANT, TROPOSPHERE_LAPSE_RATE,
};
use crate::errors::ModelError;

/// Constants shared by the atmosphere, propulsion and aerodynamics equations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Gravitational acceleration, m/s².
    pub gravity: f64,
    /// Troposphere temperature lapse rate, K/m (positive: cooling with height).
    pub lapse_rate: f64,
    /// Specific gas constant of dry air, J/(kg⋅K).
    pub gas_constant: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            lapse_rate: TROPOSPHERE_LAPSE_RATE,
            gas_constant: SPECIFIC_GAS_CONSTANT,
        }
    }
}

impl PhysicalConstants {
    /// Exponent of the ISA density ratio, `g / (R * L) - 1` (≈ 4.256 with defaults).
    pub fn density_exponent(&self) -> f64 {
        self.gravity / (self.gas_constant * self.lapse_rate) - 1.0
    }
}

/// What `Environment::validate` treats as success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Always succeed; issues are only reported.
    #[default]
    Lenient,
    /// Succeed only when the pass collected no issue at all.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub constants: PhysicalConstants,
    /// Largest absolute difference accepted between a computed value and the
    /// value found in the record.
    pub tolerance: f64,
    pub strictness: Strictness,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            tolerance: RECONCILIATION_TOLERANCE,
            strictness: Strictness::default(),
        }
    }
}

impl ModelConfig {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let constants = [
            ("gravity", self.constants.gravity),
            ("lapse_rate", self.constants.lapse_rate),
            ("gas_constant", self.constants.gas_constant),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::ConfigError(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ModelError::ConfigError(format!(
                "tolerance must be finite and >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ModelError::ConfigError(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ModelError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tolerance, 1e-10);
        assert_eq!(config.strictness, Strictness::Lenient);
    }

    #[test]
    fn test_density_exponent() {
        let constants = PhysicalConstants::default();
        assert_abs_diff_eq!(constants.density_exponent(), 4.2559, epsilon = 1e-4);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModelConfig::from_json(r#"{"strictness": "strict"}"#).unwrap();
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.constants, PhysicalConstants::default());

        let config = ModelConfig::from_json(r#"{"constants": {"gravity": 9.81}}"#).unwrap();
        assert_eq!(config.constants.gravity, 9.81);
        assert_eq!(config.constants.lapse_rate, 0.0065);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ModelConfig::from_json(r#"{"tolerance": -1.0}"#).is_err());
        assert!(ModelConfig::from_json(r#"{"constants": {"lapse_rate": 0.0}}"#).is_err());
        assert!(ModelConfig::from_json("not json").is_err());
    }
}
