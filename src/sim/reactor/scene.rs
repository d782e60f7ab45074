use anyhow::{Result, bail};
use serde::Serialize;

use crate::Vector;
use crate::sim::reactor::materials::{
    ACN_RI, CHANNEL_DIAMETER, NUM_CHANNELS, PFA_RI, PMMA_RI, QUANTUM_YIELD, REACTOR_LENGTH,
    REACTOR_THICKNESS, REACTOR_WIDTH,
};
use crate::sim::reactor::samplers::PhotonSampler;
use crate::sim::solar::aoi::reactor_normal;

/// Serializable description of a scene's geometry and materials.
///
/// Two scenes built from identical arguments always compare equal on their
/// descriptors; the light-source sampler is excluded since it carries
/// per-call spectra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneDescriptor {
    pub tilt_angle: f64,
    pub width_m: f64,
    pub length_m: f64,
    pub thickness_m: f64,
    pub num_channels: usize,
    pub channel_diameter_m: f64,
    pub slab_refractive_index: f64,
    pub channel_refractive_index: f64,
    pub mixture_refractive_index: f64,
    pub include_dye: bool,
    pub include_coating: bool,
    pub dye_quantum_yield: f64,
}

/// An immutable optical scene: the tilted reactor slab, its materials and
/// exactly one light source. Built once per time point and consumed
/// read-only by the transport engine.
pub struct Scene {
    descriptor: SceneDescriptor,
    normal: Vector,
    sampler: Box<dyn PhotonSampler>,
}

impl Scene {
    /// Builds a scene for one tilt angle and light source.
    ///
    /// Rejects `include_dye` without `include_coating`: the dye cannot exist
    /// without its carrier layer.
    pub fn build(
        tilt_angle: f64,
        sampler: Box<dyn PhotonSampler>,
        include_dye: bool,
        include_coating: bool,
    ) -> Result<Self> {
        if include_dye && !include_coating {
            bail!(
                "invalid material combination at tilt {tilt_angle}: \
                 dye requires its carrier coating"
            );
        }

        let descriptor = SceneDescriptor {
            tilt_angle,
            width_m: REACTOR_WIDTH,
            length_m: REACTOR_LENGTH,
            thickness_m: REACTOR_THICKNESS,
            num_channels: NUM_CHANNELS,
            channel_diameter_m: CHANNEL_DIAMETER,
            slab_refractive_index: PMMA_RI,
            channel_refractive_index: PFA_RI,
            mixture_refractive_index: ACN_RI,
            include_dye,
            include_coating,
            dye_quantum_yield: QUANTUM_YIELD,
        };

        Ok(Self {
            descriptor,
            normal: reactor_normal(tilt_angle),
            sampler,
        })
    }

    /// Outward normal of the irradiated front face.
    pub fn normal(&self) -> Vector {
        self.normal
    }

    pub fn tilt_angle(&self) -> f64 {
        self.descriptor.tilt_angle
    }

    pub fn include_dye(&self) -> bool {
        self.descriptor.include_dye
    }

    pub fn sampler(&self) -> &dyn PhotonSampler {
        self.sampler.as_ref()
    }

    /// Irradiated front-face area (m^2).
    pub fn surface_area_m2(&self) -> f64 {
        self.descriptor.width_m * self.descriptor.length_m
    }

    pub fn descriptor(&self) -> &SceneDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::reactor::samplers::FixedDirectSampler;
    use crate::sim::solar::spectral::wavelength_grid;
    use crate::sim::spectrum::SpectralDistribution;

    fn sampler() -> Box<dyn PhotonSampler> {
        let grid = wavelength_grid();
        let intensities = grid.iter().map(|_| 1.0).collect();
        let spectrum = SpectralDistribution::new(grid, intensities).unwrap();
        Box::new(FixedDirectSampler::new(spectrum, 60.0, 180.0, 30.0).unwrap())
    }

    #[test]
    fn test_dye_without_coating_rejected() {
        let err = Scene::build(30.0, sampler(), true, false).err();
        let msg = format!("{:#}", err.unwrap());
        assert!(msg.contains("coating"));
    }

    #[test]
    fn test_build_is_pure() {
        let a = Scene::build(25.0, sampler(), true, true).unwrap();
        let b = Scene::build(25.0, sampler(), true, true).unwrap();
        assert_eq!(a.descriptor(), b.descriptor());
        assert!(a.normal().is_close(&b.normal()));
    }

    #[test]
    fn test_normal_tracks_tilt() {
        let flat = Scene::build(0.0, sampler(), false, true).unwrap();
        assert!(flat.normal().is_close(&Vector::new(0.0, 0.0, 1.0)));

        let tilted = Scene::build(90.0, sampler(), false, true).unwrap();
        assert!((tilted.normal().dx - 1.0).abs() < 1e-12);
        assert!(tilted.normal().dz.abs() < 1e-12);
    }

    #[test]
    fn test_surface_area() {
        let s = Scene::build(0.0, sampler(), false, true).unwrap();
        assert!((s.surface_area_m2() - 0.47 * 0.47).abs() < 1e-12);
    }
}
