use anyhow::{Result, ensure};
use rand::Rng;
use rand::RngCore;

/// Planck constant (J*s).
pub const PLANCK: f64 = 6.62607015e-34;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Avogadro number (1/mol).
pub const AVOGADRO: f64 = 6.02214076e23;

/// Energy of a single photon (J) at the given wavelength (nm).
pub fn photon_energy(wavelength_nm: f64) -> f64 {
    PLANCK * SPEED_OF_LIGHT / (wavelength_nm * 1e-9)
}

/// Converts spectral irradiance (W*m^-2*nm^-1) at one wavelength (nm) into
/// photon flux (mol*m^-2*nm^-1) integrated over `integration_time_s` seconds.
pub fn irradiance_to_photon_flux(
    irradiance: f64,
    wavelength_nm: f64,
    integration_time_s: f64,
) -> f64 {
    irradiance / photon_energy(wavelength_nm) / AVOGADRO * integration_time_s
}

/// A wavelength-resolved distribution: either spectral irradiance
/// (W*m^-2*nm^-1) or photon flux (mol*m^-2*nm^-1) over a fixed interval.
///
/// Wavelengths (nm) are strictly increasing and positive; intensities are
/// non-negative. An all-zero distribution is a valid sentinel meaning
/// "nothing to simulate" (e.g. near sunrise/sunset).
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralDistribution {
    wavelengths: Vec<f64>,
    intensities: Vec<f64>,
}

impl SpectralDistribution {
    pub fn new(wavelengths: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        ensure!(
            wavelengths.len() == intensities.len(),
            "wavelength and intensity grids differ in length: {} vs {}",
            wavelengths.len(),
            intensities.len()
        );
        ensure!(wavelengths.len() >= 2, "a distribution needs at least 2 points");
        ensure!(
            wavelengths[0] > 0.0,
            "wavelengths must be positive, got {}",
            wavelengths[0]
        );
        for pair in wavelengths.windows(2) {
            ensure!(
                pair[1] > pair[0],
                "wavelengths must be strictly increasing ({} then {})",
                pair[0],
                pair[1]
            );
        }
        for &i in &intensities {
            ensure!(i >= 0.0, "intensities must be non-negative, got {i}");
        }
        Ok(Self {
            wavelengths,
            intensities,
        })
    }

    /// An all-zero distribution on the given grid (the "do not simulate" sentinel).
    pub fn zero(wavelengths: Vec<f64>) -> Result<Self> {
        let n = wavelengths.len();
        Self::new(wavelengths, vec![0.0; n])
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// True when every intensity is zero.
    pub fn is_zero(&self) -> bool {
        self.intensities.iter().all(|&i| i == 0.0)
    }

    /// Trapezoid integral over the wavelength grid.
    pub fn integral(&self) -> f64 {
        self.wavelengths
            .windows(2)
            .zip(self.intensities.windows(2))
            .map(|(w, i)| (w[1] - w[0]) * (i[0] + i[1]) / 2.0)
            .sum()
    }

    /// Converts an irradiance distribution into a photon-flux distribution.
    ///
    /// Pointwise transform on the same wavelength grid; `integration_time_s`
    /// scales the per-second flux to moles per square meter over the interval.
    pub fn to_photon_flux(&self, integration_time_s: f64) -> Self {
        let intensities = self
            .wavelengths
            .iter()
            .zip(&self.intensities)
            .map(|(&w, &i)| irradiance_to_photon_flux(i, w, integration_time_s))
            .collect();
        Self {
            wavelengths: self.wavelengths.clone(),
            intensities,
        }
    }

    /// Draws a wavelength from this distribution by inverse-CDF sampling.
    ///
    /// The cumulative density is built from the trapezoid segment areas and
    /// interpolated linearly within a segment. Callers must not sample an
    /// all-zero distribution; in that degenerate case the lowest wavelength
    /// is returned.
    pub fn sample_wavelength(&self, rng: &mut dyn RngCore) -> f64 {
        let mut cumulative = Vec::with_capacity(self.wavelengths.len());
        cumulative.push(0.0);
        let mut total = 0.0;
        for (w, i) in self
            .wavelengths
            .windows(2)
            .zip(self.intensities.windows(2))
        {
            total += (w[1] - w[0]) * (i[0] + i[1]) / 2.0;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return self.wavelengths[0];
        }

        let u: f64 = rng.gen_range(0.0..1.0);
        let target = u * total;
        for k in 1..cumulative.len() {
            if target <= cumulative[k] {
                let seg = cumulative[k] - cumulative[k - 1];
                let frac = if seg > 0.0 {
                    (target - cumulative[k - 1]) / seg
                } else {
                    0.0
                };
                return self.wavelengths[k - 1]
                    + frac * (self.wavelengths[k] - self.wavelengths[k - 1]);
            }
        }
        self.wavelengths[self.wavelengths.len() - 1]
    }
}
