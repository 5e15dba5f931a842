//! Core abstractions shared by the polder drainage solvers and components.

pub mod model;

pub use model::{Model, Snapshot};
