use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::sim::solar::{Site, SolarPosition, SpectralModel};
use crate::sim::spectrum::SpectralDistribution;

/// One daytime instant with its solar geometry and incident photon flux.
///
/// The attached distributions are in photon-flux units (mol*m^-2*nm^-1 over
/// one time step); `direct_flux`/`diffuse_flux` are their trapezoid
/// integrals (mol*m^-2 over the step).
#[derive(Debug, Clone)]
pub struct TimePoint {
    pub time: DateTime<Utc>,
    pub apparent_elevation: f64,
    pub azimuth: f64,
    pub zenith: f64,
    pub airmass: f64,
    pub direct_spectrum: SpectralDistribution,
    pub diffuse_spectrum: SpectralDistribution,
    pub direct_flux: f64,
    pub diffuse_flux: f64,
}

/// Builds the daytime time series for one site, tilt and time range.
///
/// Instants are sampled every `time_resolution_s` seconds from `start`
/// (inclusive) to `end` (exclusive). Night-time instants (apparent elevation
/// at or below the horizon) are excluded entirely, not recorded as zero.
pub fn solar_data_for_place_and_time(
    site: &Site,
    model: &dyn SpectralModel,
    tilt_angle: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_resolution_s: u32,
) -> Result<Vec<TimePoint>> {
    ensure!(end > start, "empty time range: {start} .. {end}");
    ensure!(time_resolution_s > 0, "time resolution must be positive");

    let step = Duration::seconds(time_resolution_s as i64);
    let mut points = Vec::new();
    let mut time = start;
    let mut skipped_night = 0usize;

    while time < end {
        let position = SolarPosition::calculate(site, time);
        if !position.is_above_horizon() {
            skipped_night += 1;
            time += step;
            continue;
        }

        let (direct, diffuse) = model
            .spectra(&position, tilt_angle)
            .with_context(|| format!("spectral model failed for {} at {time}", site.name))?;

        let direct_spectrum = direct.to_photon_flux(time_resolution_s as f64);
        let diffuse_spectrum = diffuse.to_photon_flux(time_resolution_s as f64);
        let direct_flux = direct_spectrum.integral();
        let diffuse_flux = diffuse_spectrum.integral();

        points.push(TimePoint {
            time,
            apparent_elevation: position.apparent_elevation,
            azimuth: position.azimuth,
            zenith: position.zenith(),
            airmass: position.airmass(),
            direct_spectrum,
            diffuse_spectrum,
            direct_flux,
            diffuse_flux,
        });
        time += step;
    }

    debug!(
        "{}: {} daytime points, {} night points excluded",
        site.name,
        points.len(),
        skipped_night
    );
    Ok(points)
}
