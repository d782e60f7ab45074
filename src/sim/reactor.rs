pub mod materials;
pub mod productivity;
pub mod runner;
pub mod samplers;
pub mod scene;

pub use productivity::{ProductivityRecord, evaluate_time_point};
pub use runner::{RunnerConfig, SimulationResult, run};
pub use samplers::{FixedDirectSampler, IsotropicDiffuseSampler, PhotonSampler};
pub use scene::Scene;
