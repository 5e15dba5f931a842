//! Numerical solvers for polder drainage models.

pub mod equation;
