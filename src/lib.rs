#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod error;
pub mod types;
pub mod ws;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Endpoint the robot backend listens on by default.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:6789";

/// Environment variable that overrides [`DEFAULT_ENDPOINT`] in the bundled demo.
pub const ENDPOINT_VAR: &str = "ROBO_TRADER_WS_URL";
