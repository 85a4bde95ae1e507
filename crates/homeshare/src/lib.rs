//! Domain library for the HomeShare marketplace: the listing catalog and its
//! query engine, account and session handling, service packages with simulated
//! billing, and the page capability table shared by every frontend.

pub mod accounts;
pub mod billing;
pub mod config;
pub mod error;
pub mod listings;
pub mod navigation;
pub mod telemetry;
