//! Location Resolution Module
//!
//! Turns the query parameters of the two forecast routes into a
//! [`LocationInput`] and resolves that into [`Coordinates`], going through the
//! geocoder for free-text searches.

use std::sync::Arc;

use tracing::debug;

use crate::geocoding::Geocoder;
use crate::models::Coordinates;
use crate::{ProxyError, Result};

/// Language preference sent to the geocoder when the caller gives none
pub const DEFAULT_LANG: &str = "en, ru";

/// Where a forecast request wants its weather from
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Neither latitude nor longitude given
    Default,
    /// Explicit coordinates
    Coordinates(Coordinates),
    /// Free-text place search
    Search { query: String, lang: String },
}

impl LocationInput {
    /// Validate the `lat`/`lon` pair: both or neither. Empty values count as absent.
    pub fn from_coordinate_params(lat: Option<&str>, lon: Option<&str>) -> Result<Self> {
        match (non_empty(lat), non_empty(lon)) {
            (None, None) => Ok(LocationInput::Default),
            (Some(lat), Some(lon)) => Ok(LocationInput::Coordinates(Coordinates::new(
                parse_number("lat", lat)?,
                parse_number("lon", lon)?,
            ))),
            _ => Err(ProxyError::validation(format!(
                "Bad request, used exactly one from {{lat, lon}}. Need both, or neither for default value (Moscow lat={}, lon={})",
                Coordinates::MOSCOW.latitude,
                Coordinates::MOSCOW.longitude
            ))),
        }
    }

    /// Validate the `search`/`lang` pair; `search` is required
    pub fn from_search_params(search: Option<&str>, lang: Option<&str>) -> Result<Self> {
        let query = non_empty(search)
            .ok_or_else(|| ProxyError::validation("Bad request, search was not provided"))?;
        let lang = non_empty(lang).unwrap_or(DEFAULT_LANG);

        Ok(LocationInput::Search {
            query: query.to_string(),
            lang: lang.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_number(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ProxyError::validation(format!("Bad request, {name} must be a number")))
}

/// Service for resolving location inputs
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    default_location: Coordinates,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, default_location: Coordinates) -> Self {
        Self {
            geocoder,
            default_location,
        }
    }

    /// Resolve a location input into coordinates
    pub async fn resolve(&self, input: LocationInput) -> Result<Coordinates> {
        debug!("Resolving location input: {:?}", input);

        let coordinates = match input {
            LocationInput::Default => self.default_location,
            LocationInput::Coordinates(coordinates) => coordinates,
            LocationInput::Search { query, lang } => self.resolve_search(&query, &lang).await?,
        };

        debug!("Resolved location: {}", coordinates.format_coordinates());
        Ok(coordinates)
    }

    /// Geocode a search phrase, taking the first candidate
    async fn resolve_search(&self, query: &str, lang: &str) -> Result<Coordinates> {
        let results = self.geocoder.search(query, lang).await?;

        let first = results
            .first()
            .ok_or_else(|| ProxyError::geocoding(format!("Location not found: {query}")))?;
        debug!(
            "Found location: {} ({:.4}, {:.4})",
            first.display_name.as_deref().unwrap_or(query),
            first.lat,
            first.lon
        );

        Ok(Coordinates::from(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::GeocodingResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Geocoder answering with a fixed list and remembering its calls
    struct FixedGeocoder {
        results: Vec<GeocodingResult>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FixedGeocoder {
        fn new(results: Vec<GeocodingResult>) -> Arc<Self> {
            Arc::new(Self {
                results,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, query: &str, lang: &str) -> Result<Vec<GeocodingResult>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), lang.to_string()));
            Ok(self.results.clone())
        }
    }

    fn candidate(lat: f64, lon: f64) -> GeocodingResult {
        GeocodingResult {
            lat,
            lon,
            display_name: None,
        }
    }

    #[test]
    fn test_coordinate_params_both_or_neither() {
        assert_eq!(
            LocationInput::from_coordinate_params(None, None).unwrap(),
            LocationInput::Default
        );
        assert_eq!(
            LocationInput::from_coordinate_params(Some(""), Some("")).unwrap(),
            LocationInput::Default
        );
        assert_eq!(
            LocationInput::from_coordinate_params(Some("59.91"), Some("10.75")).unwrap(),
            LocationInput::Coordinates(Coordinates::new(59.91, 10.75))
        );
    }

    #[test]
    fn test_exactly_one_coordinate_is_rejected() {
        let only_lat = LocationInput::from_coordinate_params(Some("59.91"), None);
        let only_lon = LocationInput::from_coordinate_params(Some(""), Some("10.75"));

        assert!(matches!(only_lat, Err(ProxyError::Validation { .. })));
        assert!(matches!(only_lon, Err(ProxyError::Validation { .. })));
        assert!(only_lat.unwrap_err().to_string().contains("exactly one"));
    }

    #[test]
    fn test_coordinates_are_not_range_checked() {
        assert_eq!(
            LocationInput::from_coordinate_params(Some("123.0"), Some("-400")).unwrap(),
            LocationInput::Coordinates(Coordinates::new(123.0, -400.0))
        );
    }

    #[test]
    fn test_non_numeric_coordinate_is_rejected() {
        let result = LocationInput::from_coordinate_params(Some("north"), Some("10.75"));
        assert!(matches!(result, Err(ProxyError::Validation { .. })));
    }

    #[test]
    fn test_search_params() {
        assert_eq!(
            LocationInput::from_search_params(Some("Oslo"), None).unwrap(),
            LocationInput::Search {
                query: "Oslo".to_string(),
                lang: DEFAULT_LANG.to_string()
            }
        );
        assert_eq!(
            LocationInput::from_search_params(Some("Oslo"), Some("nb")).unwrap(),
            LocationInput::Search {
                query: "Oslo".to_string(),
                lang: "nb".to_string()
            }
        );
        assert!(matches!(
            LocationInput::from_search_params(None, Some("nb")),
            Err(ProxyError::Validation { .. })
        ));
    }

    #[test]
    fn test_blank_search_is_forwarded_as_is() {
        assert_eq!(
            LocationInput::from_search_params(Some(" "), Some("")).unwrap(),
            LocationInput::Search {
                query: " ".to_string(),
                lang: DEFAULT_LANG.to_string()
            }
        );
        assert!(matches!(
            LocationInput::from_search_params(Some(""), None),
            Err(ProxyError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_default_skips_geocoder() {
        let geocoder = FixedGeocoder::new(vec![candidate(1.0, 2.0)]);
        let resolver = LocationResolver::new(geocoder.clone(), Coordinates::MOSCOW);

        let coordinates = resolver.resolve(LocationInput::Default).await.unwrap();

        assert_eq!(coordinates, Coordinates::MOSCOW);
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_search_takes_first_candidate() {
        let geocoder = FixedGeocoder::new(vec![candidate(55.75, 37.61), candidate(46.73, -117.0)]);
        let resolver = LocationResolver::new(geocoder.clone(), Coordinates::MOSCOW);

        let input = LocationInput::from_search_params(Some("Moscow"), None).unwrap();
        let coordinates = resolver.resolve(input).await.unwrap();

        assert_eq!(coordinates, Coordinates::new(55.75, 37.61));
        assert_eq!(
            geocoder.calls.lock().unwrap().as_slice(),
            &[("Moscow".to_string(), "en, ru".to_string())]
        );
    }

    #[tokio::test]
    async fn test_resolve_search_without_candidates_fails() {
        let resolver = LocationResolver::new(FixedGeocoder::new(Vec::new()), Coordinates::MOSCOW);

        let input = LocationInput::from_search_params(Some("Atlantis"), None).unwrap();
        let result = resolver.resolve(input).await;

        assert!(matches!(result, Err(ProxyError::Geocoding { .. })));
    }
}
