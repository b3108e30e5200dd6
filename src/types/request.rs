use bon::Builder;
use serde::{Deserialize, Serialize};

/// Commands understood by the robot backend.
///
/// Serialized as a JSON object tagged by `command`, e.g. `{"command":"ping"}`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Liveness probe, answered with `pong` or `heartbeat`
    Ping,
    /// Ask for the tradable pairs; answered with `pairs_list`
    GetAvailablePairs {
        detailed: bool,
        include_all_markets: bool,
    },
    /// Ask whether a pair is open; answered with `pair_availability`
    CheckPairAvailability { pair: String },
    /// Ask the backend to run diagnostics on a pair
    DiagnosePair { pair: String },
    /// Place a single test entry; answered with `test_entry_result`
    TestEntry(TestEntry),
}

impl Command {
    /// Request every pair across all markets, with details.
    #[must_use]
    pub const fn available_pairs() -> Self {
        Self::GetAvailablePairs {
            detailed: true,
            include_all_markets: true,
        }
    }

    #[must_use]
    pub fn check_pair_availability<S: Into<String>>(pair: S) -> Self {
        Self::CheckPairAvailability { pair: pair.into() }
    }

    #[must_use]
    pub fn diagnose_pair<S: Into<String>>(pair: S) -> Self {
        Self::DiagnosePair { pair: pair.into() }
    }
}

/// Option direction.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Call,
    Put,
}

/// Broker account the robot trades on.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    /// Demo account
    #[default]
    Practice,
    Real,
}

/// Robot configuration pushed from the dashboard.
///
/// The backend merges every known key it receives into its running
/// configuration, so the wire names are the backend's own.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
pub struct RobotSettings {
    /// Whether the robot should be trading
    #[serde(rename = "ligado")]
    #[builder(default)]
    pub enabled: bool,
    /// Stake per entry
    #[serde(rename = "valor")]
    #[builder(default = 2.0)]
    pub amount: f64,
    /// Pair to trade, e.g. `EURUSD`
    #[serde(rename = "par")]
    #[builder(into, default = "EURUSD".to_owned())]
    pub pair: String,
    #[serde(rename = "direcao")]
    #[builder(default)]
    pub direction: Direction,
    /// Whether to double up after a loss
    #[builder(default = true)]
    pub martingale: bool,
    /// Stake multiplier applied on each martingale step
    #[serde(rename = "multiplicador")]
    #[builder(default = 2.0)]
    pub multiplier: f64,
    /// Maximum number of martingale steps
    #[serde(rename = "max_mg")]
    #[builder(default = 2)]
    pub max_martingale: u32,
    /// Expiry in minutes
    #[serde(rename = "tempo")]
    #[builder(default = 5)]
    pub expiry_minutes: u32,
    #[serde(rename = "tipo_conta")]
    #[builder(default)]
    pub account_type: AccountType,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A single test entry request.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
pub struct TestEntry {
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "tempo")]
    pub expiry_minutes: u32,
    #[serde(rename = "par")]
    #[builder(into)]
    pub pair: String,
    #[serde(rename = "tipo_conta")]
    #[builder(default)]
    pub account_type: AccountType,
}
