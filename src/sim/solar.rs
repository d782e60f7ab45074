pub mod aoi;
pub mod data;
pub mod position;
pub mod site;
pub mod spectral;

pub use aoi::surface_incident;
pub use data::{TimePoint, solar_data_for_place_and_time};
pub use position::SolarPosition;
pub use site::Site;
pub use spectral::{ClearSkyModel, SpectralModel};
