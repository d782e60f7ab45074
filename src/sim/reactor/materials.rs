use crate::sim::spectrum::SpectralDistribution;

/// Refractive index of the PMMA slab.
pub const PMMA_RI: f64 = 1.48;
/// Refractive index of the PFA channel walls.
pub const PFA_RI: f64 = 1.34;
/// Refractive index of the acetonitrile reaction mixture.
pub const ACN_RI: f64 = 1.344;

/// Luminophore quantum yield (re-emission probability per absorption).
pub const QUANTUM_YIELD: f64 = 0.95;

/// Reactor footprint (m).
pub const REACTOR_WIDTH: f64 = 0.47;
pub const REACTOR_LENGTH: f64 = 0.47;
/// Slab thickness (m).
pub const REACTOR_THICKNESS: f64 = 0.008;

/// Number of parallel reaction capillaries embedded in the slab.
pub const NUM_CHANNELS: usize = 16;
/// Capillary inner diameter, 1/8 inch (m).
pub const CHANNEL_DIAMETER: f64 = 3.175e-3;

/// Fraction of the slab cross-section occupied by reaction channels.
pub fn channel_volume_fraction() -> f64 {
    let r = CHANNEL_DIAMETER / 2.0;
    NUM_CHANNELS as f64 * std::f64::consts::PI * r * r / (REACTOR_WIDTH * REACTOR_THICKNESS)
}

/// Lumogen-red-type dye absorption coefficient (1/m) at the working
/// concentration. Two absorption bands in the blue and green-yellow, falling
/// to zero past 610 nm so the red-shifted emission is waveguided with little
/// self-absorption.
const DYE_ABSORPTION: &[(f64, f64)] = &[
    (360.0, 400.0),
    (400.0, 900.0),
    (440.0, 1500.0),
    (480.0, 1200.0),
    (520.0, 1400.0),
    (560.0, 2200.0),
    (575.0, 2500.0),
    (590.0, 900.0),
    (600.0, 150.0),
    (610.0, 20.0),
    (630.0, 0.0),
    (690.0, 0.0),
];

/// Dye emission line shape (arbitrary units), red-shifted past the
/// absorption edge.
const DYE_EMISSION: &[(f64, f64)] = &[
    (595.0, 0.0),
    (605.0, 1.0),
    (620.0, 0.8),
    (640.0, 0.5),
    (660.0, 0.25),
    (690.0, 0.05),
];

/// Methylene-blue-type reaction mixture absorption coefficient (1/m) inside
/// a channel.
const REACTION_ABSORPTION: &[(f64, f64)] = &[
    (360.0, 20.0),
    (500.0, 20.0),
    (550.0, 50.0),
    (580.0, 150.0),
    (610.0, 800.0),
    (630.0, 600.0),
    (664.0, 1200.0),
    (680.0, 700.0),
    (690.0, 400.0),
];

/// Parasitic absorption of the undoped host matrix (1/m).
pub const BACKGROUND_ABSORPTION: f64 = 1.0;

/// Linear interpolation in a sorted (wavelength, value) table; clamps at the
/// table edges.
fn interp(table: &[(f64, f64)], wavelength_nm: f64) -> f64 {
    if wavelength_nm <= table[0].0 {
        return table[0].1;
    }
    if wavelength_nm >= table[table.len() - 1].0 {
        return table[table.len() - 1].1;
    }
    for pair in table.windows(2) {
        let (w0, v0) = pair[0];
        let (w1, v1) = pair[1];
        if wavelength_nm <= w1 {
            let frac = (wavelength_nm - w0) / (w1 - w0);
            return v0 + frac * (v1 - v0);
        }
    }
    table[table.len() - 1].1
}

/// Dye absorption coefficient (1/m) at the given wavelength.
pub fn dye_absorption_coefficient(wavelength_nm: f64) -> f64 {
    interp(DYE_ABSORPTION, wavelength_nm)
}

/// Reaction mixture absorption coefficient (1/m) at the given wavelength.
pub fn reaction_absorption_coefficient(wavelength_nm: f64) -> f64 {
    interp(REACTION_ABSORPTION, wavelength_nm)
}

/// Dye emission spectrum for sampling re-emitted wavelengths.
pub fn dye_emission_spectrum() -> SpectralDistribution {
    let (wavelengths, intensities): (Vec<f64>, Vec<f64>) = DYE_EMISSION.iter().copied().unzip();
    // The embedded table is well-formed, so this cannot fail.
    SpectralDistribution::new(wavelengths, intensities)
        .unwrap_or_else(|_| unreachable!("embedded emission table is valid"))
}
