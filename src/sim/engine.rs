use rand::RngCore;

use crate::{Point, Vector};
use crate::sim::reactor::scene::Scene;

pub mod slab;

/// Final classification of a simulated photon trajectory.
///
/// Only the terminal event of a trajectory matters to the estimator; the
/// full vocabulary is kept so external transport engines can report any of
/// their native outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalEvent {
    /// Absorbed by the reaction mixture inside a channel.
    React,
    /// Absorbed parasitically (host matrix, coating).
    Absorb,
    /// Left the scene without further interaction.
    Exit,
    /// Trajectory terminated by the step cap.
    Kill,
    /// Passed straight through the slab.
    Transmit,
    /// Reflected off the front face.
    Reflect,
    Scatter,
    /// Absorbed by the dye without re-emission.
    Nonradiative,
    Emit,
}

impl TerminalEvent {
    pub const ALL: [TerminalEvent; 9] = [
        TerminalEvent::React,
        TerminalEvent::Absorb,
        TerminalEvent::Exit,
        TerminalEvent::Kill,
        TerminalEvent::Transmit,
        TerminalEvent::Reflect,
        TerminalEvent::Scatter,
        TerminalEvent::Nonradiative,
        TerminalEvent::Emit,
    ];

    /// Stable index into per-event count arrays.
    pub fn index(self) -> usize {
        match self {
            TerminalEvent::React => 0,
            TerminalEvent::Absorb => 1,
            TerminalEvent::Exit => 2,
            TerminalEvent::Kill => 3,
            TerminalEvent::Transmit => 4,
            TerminalEvent::Reflect => 5,
            TerminalEvent::Scatter => 6,
            TerminalEvent::Nonradiative => 7,
            TerminalEvent::Emit => 8,
        }
    }
}

/// One photon as emitted by a light source sampler.
#[derive(Debug, Clone, Copy)]
pub struct Photon {
    /// Wavelength in nm.
    pub wavelength: f64,
    pub position: Point,
    /// Unit vector along the direction of travel.
    pub direction: Vector,
}

/// Photon-transport collaborator: follows one photon through a scene until a
/// terminal event.
pub trait TransportEngine: Send + Sync {
    fn trace(&self, scene: &Scene, photon: &Photon, rng: &mut dyn RngCore) -> TerminalEvent;
}
