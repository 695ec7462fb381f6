//! Small enumerations shared across the data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of on-chain action a [`super::event::WalletEvent`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A plain native-value transfer.
    Transfer,
    /// A call into a contract that is not a recognized token transfer.
    ContractCall,
    /// An ERC20-style token transfer.
    TokenTransfer,
}

/// Execution status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// The transaction's receipt reported success.
    Success,
    /// The transaction's receipt reported failure (reverted).
    Failed,
}

/// Coarse reputation classification derived from a reputation score.
///
/// # Thresholds
/// `LOW` for `score >= 70`, `MEDIUM` for `50 <= score < 70`,
/// `HIGH` for `30 <= score < 50`, `CRITICAL` for `score < 30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Reputation score in `[70, 100]`.
    Low,
    /// Reputation score in `[50, 70)`.
    Medium,
    /// Reputation score in `[30, 50)`.
    High,
    /// Reputation score in `[0, 30)`.
    Critical,
}

impl RiskLevel {
    /// Classify a clamped reputation score into a risk level.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Low
        } else if score >= 50.0 {
            Self::Medium
        } else if score >= 30.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// The numeric encoding used on-chain by the Flag Registry contract
    /// (`0 = LOW ... 3 = CRITICAL`).
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

/// Error returned when an on-chain risk-level byte is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid risk level value: {0}")]
pub struct InvalidRiskLevel(pub u8);

impl TryFrom<u8> for RiskLevel {
    type Error = InvalidRiskLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Medium),
            2 => Ok(Self::High),
            3 => Ok(Self::Critical),
            other => Err(InvalidRiskLevel(other)),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}
