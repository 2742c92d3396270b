//! Location model for geographic coordinates

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Moscow, used when a request carries no coordinates
    pub const MOSCOW: Coordinates = Coordinates {
        latitude: 55.7558,
        longitude: 37.6173,
    };

    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as a `lat, lon` string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::MOSCOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_moscow() {
        let coords = Coordinates::default();
        assert_eq!(coords.latitude, 55.7558);
        assert_eq!(coords.longitude, 37.6173);
    }

    #[test]
    fn test_format_coordinates() {
        let coords = Coordinates::new(46.818_234, 8.227_456);
        assert_eq!(coords.format_coordinates(), "46.8182, 8.2275");
    }
}
