//! Typed messages exchanged with the robot backend.
//!
//! Outbound requests live in [`request`]; [`response`] offers a typed view
//! over the JSON values delivered to `message` observers.

pub mod request;
pub mod response;

pub use request::{AccountType, Command, Direction, RobotSettings, TestEntry};
pub use response::{ServerMessage, robot_status};
