//! Domain errors

use thiserror::Error;

/// Errors raised when externally supplied tokens (device-model CSV values,
/// stored strings) do not map onto a domain enum.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown charging rate unit: {0}")]
    UnknownChargingRateUnit(String),

    #[error("Unknown charging profile purpose: {0}")]
    UnknownChargingProfilePurpose(String),

    #[error("Unknown charging profile kind: {0}")]
    UnknownChargingProfileKind(String),

    #[error("Unknown recurrency kind: {0}")]
    UnknownRecurrencyKind(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
