use rand::Rng;
use rand::RngCore;

use crate::sim::engine::{Photon, TerminalEvent, TransportEngine};
use crate::sim::reactor::materials::{
    BACKGROUND_ABSORPTION, PMMA_RI, QUANTUM_YIELD, REACTOR_THICKNESS, REACTOR_WIDTH,
    channel_volume_fraction, dye_absorption_coefficient, dye_emission_spectrum,
    reaction_absorption_coefficient,
};
use crate::sim::reactor::scene::Scene;
use crate::sim::spectrum::SpectralDistribution;

/// Maximum number of absorption/re-emission cycles before a trajectory is
/// killed.
const MAX_STEPS: usize = 50;

/// Built-in probabilistic transport engine for the tilted slab reactor.
///
/// Models the optical chain of a luminescent concentrator without explicit
/// ray/surface intersections: Fresnel loss at the front face, Beer-Lambert
/// competition between dye, reaction channels and host matrix along each
/// chord, dye re-emission with total-internal-reflection waveguiding toward
/// the channels. Wavelength-resolved; geometry enters through chord lengths.
pub struct SlabEngine {
    emission: SpectralDistribution,
}

impl SlabEngine {
    pub fn new() -> Self {
        Self {
            emission: dye_emission_spectrum(),
        }
    }

    /// Schlick approximation of the Fresnel reflectance at the air/slab
    /// interface.
    fn fresnel_reflectance(cos_incident: f64) -> f64 {
        let r0 = ((1.0 - PMMA_RI) / (1.0 + PMMA_RI)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos_incident).powi(5)
    }

    /// Cosine of the refracted angle inside the slab (Snell).
    fn refracted_cosine(cos_incident: f64) -> f64 {
        let sin_i = (1.0 - cos_incident * cos_incident).max(0.0).sqrt();
        let sin_t = sin_i / PMMA_RI;
        (1.0 - sin_t * sin_t).max(0.0).sqrt()
    }
}

impl Default for SlabEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// How the current chord terminates if the photon is not absorbed along it.
#[derive(Clone, Copy, PartialEq)]
enum ChordKind {
    /// First pass through the slab: leaves through the back face.
    Through,
    /// Re-emitted within the escape cone: leaves through a face.
    EscapeCone,
    /// Trapped by total internal reflection: leaves at the slab edge.
    Waveguided,
}

impl TransportEngine for SlabEngine {
    fn trace(&self, scene: &Scene, photon: &Photon, rng: &mut dyn RngCore) -> TerminalEvent {
        let normal = scene.normal();
        let cos_incident = -photon.direction.dot(normal);
        if cos_incident <= 0.0 {
            // Travelling away from the front face: never enters the slab
            return TerminalEvent::Exit;
        }

        if rng.gen_range(0.0..1.0) < Self::fresnel_reflectance(cos_incident) {
            return TerminalEvent::Reflect;
        }

        let channel_fraction = channel_volume_fraction();
        let mut wavelength = photon.wavelength;
        let cos_refracted = Self::refracted_cosine(cos_incident).max(1e-6);
        let mut chord = REACTOR_THICKNESS / cos_refracted;
        let mut kind = ChordKind::Through;

        for _step in 0..MAX_STEPS {
            let mu_dye = if scene.include_dye() {
                dye_absorption_coefficient(wavelength)
            } else {
                0.0
            };
            let mu_rx = reaction_absorption_coefficient(wavelength) * channel_fraction;
            let mu_bg = BACKGROUND_ABSORPTION;
            let mu_total = mu_dye + mu_rx + mu_bg;

            let p_absorbed = 1.0 - (-mu_total * chord).exp();
            if rng.gen_range(0.0..1.0) >= p_absorbed {
                // Survived the chord
                return match kind {
                    ChordKind::Through => TerminalEvent::Transmit,
                    ChordKind::EscapeCone | ChordKind::Waveguided => TerminalEvent::Exit,
                };
            }

            // Absorbed: pick the absorber proportionally to its coefficient
            let roll = rng.gen_range(0.0..mu_total);
            if roll < mu_rx {
                return TerminalEvent::React;
            }
            if roll < mu_rx + mu_bg {
                return TerminalEvent::Absorb;
            }

            // Dye absorption: re-emit with the luminophore quantum yield
            if rng.gen_range(0.0..1.0) >= QUANTUM_YIELD {
                return TerminalEvent::Nonradiative;
            }
            wavelength = self.emission.sample_wavelength(rng);

            // Isotropic re-emission: the escape cone is set by the critical
            // angle, everything outside it is waveguided toward the edges
            let cos_theta: f64 = rng.gen_range(-1.0..1.0);
            let cos_critical = (1.0 - 1.0 / (PMMA_RI * PMMA_RI)).sqrt();
            if cos_theta.abs() > cos_critical {
                chord = (REACTOR_THICKNESS / 2.0) / cos_theta.abs().max(1e-6);
                kind = ChordKind::EscapeCone;
            } else {
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                chord = (REACTOR_WIDTH / 2.0) / sin_theta.max(1e-6);
                kind = ChordKind::Waveguided;
            }
        }

        TerminalEvent::Kill
    }
}
