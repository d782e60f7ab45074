use crate::Vector;

/// Converts spherical angles (radians) to a cartesian unit vector.
///
/// `theta` is the polar angle from +Z, `phi` the azimuthal angle from +X.
pub fn spherical_to_cart(theta: f64, phi: f64) -> Vector {
    let sin_theta = theta.sin();
    Vector::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
}

/// Outward normal of a reactor tilted by `tilt_angle` degrees.
///
/// The reactor is tilted toward the south (phi = 0 in the reactor frame), so
/// at 0 degrees the normal points straight up and at 90 degrees it is
/// horizontal.
pub fn reactor_normal(tilt_angle: f64) -> Vector {
    spherical_to_cart(tilt_angle.to_radians(), 0.0)
}

/// Unit vector pointing toward the sun, in the reactor frame.
///
/// Uses the convention `theta = 90 - elevation`, `phi = 180 - azimuth`, which
/// places a south-facing sun (azimuth 180) at phi = 0, aligned with the tilt
/// direction of the reactor.
pub fn solar_vector(solar_elevation: f64, solar_azimuth: f64) -> Vector {
    spherical_to_cart(
        (90.0 - solar_elevation).to_radians(),
        (180.0 - solar_azimuth).to_radians(),
    )
}

/// Projection of the solar vector onto the tilted reactor's outward normal.
///
/// Returns a value in [-1, 1]. A non-positive value means direct sunlight
/// falls on the reactor's non-functional back face, and the caller must skip
/// the direct-beam simulation for that time point. The value is returned
/// signed (not clamped) so callers can distinguish grazing from back-face
/// illumination.
pub fn surface_incident(tilt_angle: f64, solar_elevation: f64, solar_azimuth: f64) -> f64 {
    reactor_normal(tilt_angle).dot(solar_vector(solar_elevation, solar_azimuth))
}
