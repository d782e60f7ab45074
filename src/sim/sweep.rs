pub mod driver;
pub mod store;

pub use driver::{AngleProductivityCurve, SweepConfig, evaluate_tilt_angle, sweep_tilt_angles};
pub use store::RecordStore;
