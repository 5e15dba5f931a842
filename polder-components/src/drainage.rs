//! Drainage of a polder through a pumping station fed by a canal network.
//!
//! Water enters the catchment storage as recharge, flows through the canals
//! into the inner basin at the sea dike, and is lifted to the sea by pumps
//! (or sluiced by gravity at low tide). All levels are in millimetres
//! relative to a fixed vertical datum; volumes and flows are in water-balance
//! millimetres, a depth-equivalent over the whole catchment.

mod canal;
mod params;

pub mod capacity;
pub mod ensemble;
pub mod forcing;
pub mod pump_curve;
pub mod storage;

pub use canal::CanalLaw;
pub use capacity::{Capacity, Levels};
pub use forcing::{ForcingError, ForcingSeries, ForcingStep};
pub use params::{ParameterError, Parameters};
pub use pump_curve::{CurveError, Polynomial, PumpCurve, TabulatedCurve};
pub use storage::{Output, State, StepRecord, StorageModel, Utilization};
