use anyhow::{Result, ensure};
use rand::Rng;
use rand::RngCore;

use crate::geom::rotation::rotate_points_around_vector;
use crate::{Point, Vector};
use crate::sim::engine::Photon;
use crate::sim::reactor::materials::{REACTOR_LENGTH, REACTOR_WIDTH};
use crate::sim::solar::aoi::{reactor_normal, solar_vector};
use crate::sim::spectrum::SpectralDistribution;

/// Height of the emission plane above the reactor's front face (m).
const LIGHT_HEIGHT: f64 = 0.05;

/// A light source: draws one photon (wavelength, start position, direction)
/// per call.
pub trait PhotonSampler: Send + Sync {
    fn sample(&self, rng: &mut dyn RngCore) -> Photon;
}

/// Draws a random start position on the emission plane tilted with the
/// reactor.
fn sample_emission_position(tilt_angle: f64, rng: &mut dyn RngCore) -> Point {
    let x = rng.gen_range(-REACTOR_WIDTH / 2.0..REACTOR_WIDTH / 2.0);
    let y = rng.gen_range(-REACTOR_LENGTH / 2.0..REACTOR_LENGTH / 2.0);
    let local = Point::new(x, y, LIGHT_HEIGHT);
    let rotated =
        rotate_points_around_vector(&[local], &Vector::new(0.0, 1.0, 0.0), tilt_angle.to_radians());
    rotated[0]
}

/// Direct-beam light source: all photons share the solar direction, with the
/// wavelength drawn from the time point's direct spectrum.
pub struct FixedDirectSampler {
    spectrum: SpectralDistribution,
    direction: Vector,
    tilt_angle: f64,
}

impl FixedDirectSampler {
    pub fn new(
        spectrum: SpectralDistribution,
        solar_elevation: f64,
        solar_azimuth: f64,
        tilt_angle: f64,
    ) -> Result<Self> {
        ensure!(
            !spectrum.is_zero(),
            "cannot sample photons from an all-zero direct spectrum \
             (elevation {solar_elevation}, azimuth {solar_azimuth})"
        );
        // Photons travel opposite to the sun vector
        let direction = solar_vector(solar_elevation, solar_azimuth).reversed();
        Ok(Self {
            spectrum,
            direction,
            tilt_angle,
        })
    }
}

impl PhotonSampler for FixedDirectSampler {
    fn sample(&self, rng: &mut dyn RngCore) -> Photon {
        Photon {
            wavelength: self.spectrum.sample_wavelength(rng),
            position: sample_emission_position(self.tilt_angle, rng),
            direction: self.direction,
        }
    }
}

/// Diffuse-sky light source: directions drawn uniformly over the upper
/// hemisphere, rejecting those that would hit the reactor's back face.
pub struct IsotropicDiffuseSampler {
    spectrum: SpectralDistribution,
    normal: Vector,
    tilt_angle: f64,
}

impl IsotropicDiffuseSampler {
    pub fn new(spectrum: SpectralDistribution, tilt_angle: f64) -> Result<Self> {
        ensure!(
            !spectrum.is_zero(),
            "cannot sample photons from an all-zero diffuse spectrum (tilt {tilt_angle})"
        );
        Ok(Self {
            spectrum,
            normal: reactor_normal(tilt_angle),
            tilt_angle,
        })
    }

    /// Uniform direction on the upper (sky) hemisphere.
    fn sky_direction(rng: &mut dyn RngCore) -> Vector {
        let cos_theta: f64 = rng.gen_range(0.0..1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi: f64 = rng.gen_range(0.0..2.0 * std::f64::consts::PI);
        Vector::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }
}

impl PhotonSampler for IsotropicDiffuseSampler {
    fn sample(&self, rng: &mut dyn RngCore) -> Photon {
        // Rejection sampling: keep drawing sky directions until one faces
        // the front of the tilted plane. Acceptance is at least ~50% for any
        // tilt in [0, 90], so this terminates quickly.
        let sun_like = loop {
            let d = Self::sky_direction(rng);
            if d.dot(self.normal) > 0.0 {
                break d;
            }
        };
        Photon {
            wavelength: self.spectrum.sample_wavelength(rng),
            position: sample_emission_position(self.tilt_angle, rng),
            direction: sun_like.reversed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::solar::spectral::wavelength_grid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spectrum() -> SpectralDistribution {
        let grid = wavelength_grid();
        let intensities = grid.iter().map(|_| 1.0).collect();
        SpectralDistribution::new(grid, intensities).unwrap()
    }

    #[test]
    fn test_direct_sampler_rejects_zero_spectrum() {
        let zero = SpectralDistribution::zero(wavelength_grid()).unwrap();
        assert!(FixedDirectSampler::new(zero, 45.0, 180.0, 30.0).is_err());
    }

    #[test]
    fn test_direct_sampler_fixed_direction() {
        let sampler = FixedDirectSampler::new(spectrum(), 60.0, 180.0, 30.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let a = sampler.sample(&mut rng);
        let b = sampler.sample(&mut rng);
        assert!(a.direction.is_close(&b.direction));
        // Sun at elevation 60 to the south: photons travel downward
        assert!(a.direction.dz < 0.0);
        assert!((a.direction.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_direct_sampler_wavelengths_in_window() {
        let sampler = FixedDirectSampler::new(spectrum(), 60.0, 180.0, 30.0).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let p = sampler.sample(&mut rng);
            assert!((360.0..=690.0).contains(&p.wavelength));
        }
    }

    #[test]
    fn test_diffuse_sampler_front_face_only() {
        for tilt in [0.0, 30.0, 60.0, 90.0] {
            let sampler = IsotropicDiffuseSampler::new(spectrum(), tilt).unwrap();
            let normal = reactor_normal(tilt);
            let mut rng = StdRng::seed_from_u64(9);
            for _ in 0..500 {
                let p = sampler.sample(&mut rng);
                // Every accepted photon travels toward the front face
                assert!(
                    p.direction.dot(normal) < 0.0,
                    "tilt {tilt}: photon direction {} faces the back",
                    p.direction
                );
            }
        }
    }

    #[test]
    fn test_emission_positions_follow_tilt() {
        let sampler = FixedDirectSampler::new(spectrum(), 60.0, 180.0, 90.0).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        // At 90 degrees tilt the emission plane is vertical: x is fixed at
        // the light height, the old x extent maps onto -z
        for _ in 0..50 {
            let p = sampler.sample(&mut rng);
            assert!((p.position.x - LIGHT_HEIGHT).abs() < 1e-9);
            assert!(p.position.z.abs() <= REACTOR_WIDTH / 2.0 + 1e-9);
        }
    }
}
