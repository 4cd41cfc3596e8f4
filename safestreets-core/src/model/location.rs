use geo::Point;
use serde::Serialize;

use crate::Error;

/// Point being analysed, with optional display metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    lat: f64,
    lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    /// Validates and creates a location from decimal degrees
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] for non-finite or out of range coordinates
    pub fn new(lat: f64, lon: f64) -> Result<Self, Error> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(Error::InvalidLocation(format!(
                "coordinates must be finite, got ({lat}, {lon})"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidLocation(format!(
                "latitude {lat} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidLocation(format!(
                "longitude {lon} outside [-180, 180]"
            )));
        }

        Ok(Self {
            lat,
            lon,
            display_name: None,
            city: None,
            country: None,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Location as a `geo` point (x = longitude, y = latitude)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Human-readable label, falling back to the raw coordinates
    pub fn label(&self) -> String {
        match (&self.display_name, &self.city) {
            (Some(name), _) => name.clone(),
            (None, Some(city)) => city.clone(),
            (None, None) => format!("{:.5}, {:.5}", self.lat, self.lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
        assert!(Location::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn label_prefers_display_name() {
        let location = Location::new(40.0, -75.0).unwrap().with_city("Philadelphia");
        assert_eq!(location.label(), "Philadelphia");
        let named = location.with_name("City Hall");
        assert_eq!(named.label(), "City Hall");
        assert_eq!(Location::new(1.0, 2.0).unwrap().label(), "1.00000, 2.00000");
    }
}
