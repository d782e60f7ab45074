use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::Vector;
use crate::sim::solar::Site;

/// Solar position (azimuth and elevation angles) at one instant.
#[derive(Debug, Clone, Copy)]
pub struct SolarPosition {
    /// Apparent solar elevation in degrees (0 = horizon, 90 = zenith),
    /// including a standard atmospheric refraction correction.
    pub apparent_elevation: f64,
    /// Solar azimuth angle in degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
    pub azimuth: f64,
}

impl SolarPosition {
    /// Calculates the solar position using the Spencer algorithm.
    pub fn calculate(site: &Site, time: DateTime<Utc>) -> Self {
        let lat = site.latitude.to_radians();
        let day_of_year = time.ordinal() as f64;
        let utc_hour = time.hour() as f64
            + time.minute() as f64 / 60.0
            + time.second() as f64 / 3600.0;

        // Day angle (Spencer)
        let gamma = 2.0 * std::f64::consts::PI * (day_of_year - 1.0) / 365.0;

        // Solar declination (Spencer approximation)
        let declination = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
            - 0.006758 * (2.0 * gamma).cos()
            + 0.000907 * (2.0 * gamma).sin()
            - 0.002697 * (3.0 * gamma).cos()
            + 0.00148 * (3.0 * gamma).sin();

        // Equation of time (Spencer), minutes
        let eot = 229.18
            * (0.000075 + 0.001868 * gamma.cos()
                - 0.032077 * gamma.sin()
                - 0.014615 * (2.0 * gamma).cos()
                - 0.04089 * (2.0 * gamma).sin());

        // Local solar time: UTC shifted by longitude and the equation of
        // time, wrapped into [0, 24) so far-from-Greenwich sites keep the
        // hour angle in the correct half of the day
        let solar_hour = (utc_hour + site.longitude / 15.0 + eot / 60.0).rem_euclid(24.0);

        // Hour angle (15 degrees per hour from solar noon)
        let hour_angle = (solar_hour - 12.0) * 15.0_f64.to_radians();

        // Solar elevation
        let sin_elev =
            lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
        let elevation = sin_elev.asin().to_degrees();

        // Solar azimuth
        let cos_azimuth = (declination.sin() * lat.cos()
            - declination.cos() * lat.sin() * hour_angle.cos())
            / elevation.to_radians().cos().max(1e-10);

        let mut azimuth = cos_azimuth.clamp(-1.0, 1.0).acos().to_degrees();
        if hour_angle > 0.0 {
            azimuth = 360.0 - azimuth;
        }

        Self {
            apparent_elevation: elevation + refraction(elevation),
            azimuth,
        }
    }

    /// Returns true if the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.apparent_elevation > 0.0
    }

    /// Apparent zenith angle in degrees.
    pub fn zenith(&self) -> f64 {
        90.0 - self.apparent_elevation
    }

    /// Kasten-Young relative airmass. Infinite below the horizon.
    pub fn airmass(&self) -> f64 {
        if !self.is_above_horizon() {
            return f64::INFINITY;
        }
        let z = self.zenith();
        1.0 / (z.to_radians().cos() + 0.50572 * (96.07995 - z).powf(-1.6364))
    }

    /// Converts solar position to a unit vector pointing toward the sun.
    pub fn to_direction(&self) -> Vector {
        let alt = self.apparent_elevation.to_radians();
        let azi = self.azimuth.to_radians();

        // Convention: azimuth from north clockwise
        // North = +Y, East = +X
        let x = alt.cos() * azi.sin();
        let y = alt.cos() * azi.cos();
        let z = alt.sin();

        Vector::new(x, y, z)
    }
}

/// Atmospheric refraction correction in degrees (Saemundsson), valid for
/// elevations near and above the horizon.
fn refraction(elevation_deg: f64) -> f64 {
    if elevation_deg < -1.0 {
        return 0.0;
    }
    let arg = elevation_deg + 10.3 / (elevation_deg + 5.11);
    1.02 / arg.to_radians().tan() / 60.0
}
