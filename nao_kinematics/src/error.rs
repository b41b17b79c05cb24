use thiserror::Error;

use crate::types::LegSide;

/// Top-level error type for nao_kinematics.
#[derive(Debug, Error)]
pub enum KinematicsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No joint configuration reaches the requested {side} foot pose")]
    GeometricInfeasible { side: LegSide },
}

/// Errors raised while loading or validating a [`KinematicsConfig`](crate::KinematicsConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid dimension {name}: {value} (must be finite and > 0)")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Invalid {side} {joint} limit: low={low}, high={high}")]
    InvalidLimit {
        side: LegSide,
        joint: &'static str,
        low: f64,
        high: f64,
    },

    #[error("Standing pose contains a non-finite angle at index {index}")]
    NonFiniteStandingPose { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematics_error_from_config_error() {
        let err = ConfigError::InvalidDimension {
            name: "thigh_length",
            value: -1.0,
        };
        let kin_err: KinematicsError = err.into();
        assert!(matches!(kin_err, KinematicsError::Config(_)));
        assert!(kin_err.to_string().contains("thigh_length"));
    }

    #[test]
    fn config_error_from_json() {
        let json_err = serde_json::from_str::<f64>("not a number").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            KinematicsError::GeometricInfeasible {
                side: LegSide::Left
            }
            .to_string(),
            "No joint configuration reaches the requested left foot pose"
        );
        assert_eq!(
            ConfigError::InvalidLimit {
                side: LegSide::Right,
                joint: "knee_pitch",
                low: 1.0,
                high: 0.0,
            }
            .to_string(),
            "Invalid right knee_pitch limit: low=1, high=0"
        );
        assert_eq!(
            ConfigError::NonFiniteStandingPose { index: 3 }.to_string(),
            "Standing pose contains a non-finite angle at index 3"
        );
    }
}
