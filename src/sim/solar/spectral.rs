use anyhow::Result;

use crate::sim::solar::SolarPosition;
use crate::sim::solar::aoi::surface_incident;
use crate::sim::spectrum::SpectralDistribution;

/// Lower edge of the dye absorption window (nm).
pub const WAVELENGTH_MIN: f64 = 360.0;
/// Upper edge of the dye absorption window (nm).
pub const WAVELENGTH_MAX: f64 = 690.0;
/// Number of grid points across the window.
pub const WAVELENGTH_POINTS: usize = 27;

/// Below this apparent elevation (degrees) the atmospheric model is not
/// meaningful and both spectra are returned as all-zero sentinels.
pub const MIN_ELEVATION: f64 = 2.0;

/// Atmospheric radiative-transfer collaborator: produces plane-of-array
/// spectral irradiance (W*m^-2*nm^-1) for one solar position and tilt.
pub trait SpectralModel: Send + Sync {
    /// Returns `(direct, diffuse)` irradiance distributions on the tilted
    /// plane, trimmed to the dye wavelength window.
    fn spectra(
        &self,
        position: &SolarPosition,
        tilt_angle: f64,
    ) -> Result<(SpectralDistribution, SpectralDistribution)>;
}

/// The wavelength grid shared by all spectra produced in one run.
pub fn wavelength_grid() -> Vec<f64> {
    let step = (WAVELENGTH_MAX - WAVELENGTH_MIN) / (WAVELENGTH_POINTS - 1) as f64;
    (0..WAVELENGTH_POINTS)
        .map(|i| WAVELENGTH_MIN + i as f64 * step)
        .collect()
}

/// A simple clear-sky spectral model.
///
/// The top-of-atmosphere curve is a smooth daylight-shaped spectrum over the
/// dye window; the beam component is attenuated with the standard
/// `0.7^(airmass^0.678)` clear-sky transmittance and projected onto the
/// tilted plane; the diffuse component is isotropic-sky, scaled by the
/// (1 + cos(tilt)) / 2 view factor.
#[derive(Debug, Clone)]
pub struct ClearSkyModel {
    /// Fraction of the horizontal clear-sky irradiance that arrives diffusely.
    pub diffuse_fraction: f64,
}

impl ClearSkyModel {
    pub fn new() -> Self {
        Self {
            diffuse_fraction: 0.15,
        }
    }

    /// Extraterrestrial-like spectral irradiance (W*m^-2*nm^-1).
    fn top_of_atmosphere(wavelength_nm: f64) -> f64 {
        let x = (wavelength_nm - 520.0) / 180.0;
        1.6 * (-0.5 * x * x).exp()
    }
}

impl Default for ClearSkyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralModel for ClearSkyModel {
    fn spectra(
        &self,
        position: &SolarPosition,
        tilt_angle: f64,
    ) -> Result<(SpectralDistribution, SpectralDistribution)> {
        let grid = wavelength_grid();

        if position.apparent_elevation < MIN_ELEVATION {
            // Near sunrise/sunset the model output is unreliable; emit the
            // all-zero sentinel for both components.
            let direct = SpectralDistribution::zero(grid.clone())?;
            let diffuse = SpectralDistribution::zero(grid)?;
            return Ok((direct, diffuse));
        }

        let airmass = position.airmass();
        let beam_transmittance = 0.7_f64.powf(airmass.powf(0.678));
        let projection = surface_incident(tilt_angle, position.apparent_elevation, position.azimuth);

        let direct = if projection > 0.0 {
            let intensities = grid
                .iter()
                .map(|&w| Self::top_of_atmosphere(w) * beam_transmittance * projection)
                .collect();
            SpectralDistribution::new(grid.clone(), intensities)?
        } else {
            // Back-face illumination: exclusion sentinel, no direct simulation.
            SpectralDistribution::zero(grid.clone())?
        };

        let sky_view = (1.0 + tilt_angle.to_radians().cos()) / 2.0;
        let sin_elev = position.apparent_elevation.to_radians().sin();
        let diffuse_scale = self.diffuse_fraction * sin_elev.max(0.0).sqrt() * sky_view;
        let intensities = grid
            .iter()
            .map(|&w| Self::top_of_atmosphere(w) * diffuse_scale)
            .collect();
        let diffuse = SpectralDistribution::new(grid, intensities)?;

        Ok((direct, diffuse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noonish() -> SolarPosition {
        SolarPosition {
            apparent_elevation: 55.0,
            azimuth: 180.0,
        }
    }

    #[test]
    fn test_grid_shape() {
        let grid = wavelength_grid();
        assert_eq!(grid.len(), WAVELENGTH_POINTS);
        assert_eq!(grid[0], WAVELENGTH_MIN);
        assert_eq!(grid[grid.len() - 1], WAVELENGTH_MAX);
    }

    #[test]
    fn test_daytime_spectra_nonzero() {
        let model = ClearSkyModel::new();
        let (direct, diffuse) = model.spectra(&noonish(), 30.0).unwrap();
        assert!(!direct.is_zero());
        assert!(!diffuse.is_zero());
        assert!(direct.integral() > diffuse.integral());
    }

    #[test]
    fn test_low_sun_zero_sentinel() {
        let model = ClearSkyModel::new();
        let pos = SolarPosition {
            apparent_elevation: 1.0,
            azimuth: 95.0,
        };
        let (direct, diffuse) = model.spectra(&pos, 30.0).unwrap();
        assert!(direct.is_zero());
        assert!(diffuse.is_zero());
    }

    #[test]
    fn test_back_face_sun_zeroes_direct_only() {
        let model = ClearSkyModel::new();
        // Vertical south-facing reactor, sun in the north
        let pos = SolarPosition {
            apparent_elevation: 20.0,
            azimuth: 10.0,
        };
        let (direct, diffuse) = model.spectra(&pos, 90.0).unwrap();
        assert!(direct.is_zero());
        assert!(!diffuse.is_zero());
    }

    #[test]
    fn test_direct_tracks_projection() {
        let model = ClearSkyModel::new();
        let pos = noonish();
        // Tilt aligned with the sun beats a flat reactor
        let (aligned, _) = model.spectra(&pos, 90.0 - pos.apparent_elevation).unwrap();
        let (flat, _) = model.spectra(&pos, 0.0).unwrap();
        assert!(aligned.integral() > flat.integral());
    }

    #[test]
    fn test_diffuse_favors_low_tilt() {
        let model = ClearSkyModel::new();
        let pos = noonish();
        let (_, flat) = model.spectra(&pos, 0.0).unwrap();
        let (_, vertical) = model.spectra(&pos, 90.0).unwrap();
        assert!(flat.integral() > vertical.integral());
    }
}
