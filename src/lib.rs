//! Tripway
//!
//! Trip lifecycle state machine and pricing engine for a companion-driver
//! marketplace: customers book companion drivers for trips (shopping,
//! hospital visits, errands), drivers execute them through a fixed progress
//! protocol, and every booking carries a reproducible cost breakdown
//! (deposit, service fee, company commission, driver earnings).

pub mod config;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod progress;
pub mod services;
pub mod status;
pub mod storage;
pub mod trip;
