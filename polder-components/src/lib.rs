//! Components for simulating drainage of a below-sea-level polder.
//!
//! The [`drainage`] module holds the physical pieces (pump curves, the canal
//! law, the instantaneous capacity solver) and the storage simulation that
//! drives them over a forcing series. [`config`] loads scenario settings and
//! [`metrics`] scores simulated series against observations.

pub mod config;
pub mod drainage;
pub mod metrics;
