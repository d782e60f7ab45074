use serde::{Deserialize, Serialize};

/// A geographic site for which productivity is estimated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Meters above sea level.
    pub altitude: f64,
}

impl Site {
    pub fn new(name: &str, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            altitude,
        }
    }

    /// Site name in a filesystem-friendly form (lowercase, underscores).
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    pub fn eindhoven() -> Self {
        Self::new("Eindhoven", 51.4416, 5.6497, 17.0)
    }

    pub fn north_cape() -> Self {
        Self::new("North Cape", 70.976021, 25.983061, 17.0)
    }

    pub fn townsville() -> Self {
        Self::new("Townsville", -19.3239872, 146.7605092, 16.3)
    }

    pub fn plataforma_solar_almeria() -> Self {
        Self::new("Plataforma Solar de Almeria", 37.09454882268096, -2.3586145374427008, 499.0)
    }
}
