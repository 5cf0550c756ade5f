//! Location resolution and disambiguation.
//!
//! A caller names a place either by city (optionally narrowed to a country) or
//! by explicit coordinates. City queries go through the geocoder; when several
//! places share the name, the most populous one wins. Equal populations are
//! broken by the configured preferred country, then by the order the geocoder
//! returned them, so identical inputs always resolve to the same place.

use serde::Serialize;

use crate::client::OpenMeteoClient;
use crate::constants::{ISO_COUNTRY_CODES, MAX_GEOCODE_LIMIT};
use crate::error::WeatherError;
use crate::models::{GeocodeCandidate, LocationArgs};

/// A validated request for a place
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City {
        city: String,
        /// Upper-case ISO 3166-1 alpha-2 code
        country: Option<String>,
        limit: u32,
    },
    Coordinates {
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Coordinates,
    Geocoded,
}

/// The single point a weather or air-quality lookup is made for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub resolved_from: ResolutionSource,
}

impl LocationQuery {
    /// Build a query from raw tool arguments.
    ///
    /// Exactly one of the two forms must be present: `city`/`country` or
    /// `latitude`/`longitude`.
    pub fn from_args(
        args: &LocationArgs,
        limit: Option<i64>,
        default_limit: u32,
    ) -> Result<Self, WeatherError> {
        let names_city = args.city.is_some() || args.country.is_some();
        let names_point = args.latitude.is_some() || args.longitude.is_some();

        match (names_city, names_point) {
            (true, true) => Err(WeatherError::validation(
                "Provide either city/country or latitude/longitude, not both",
            )),
            (false, false) => Err(WeatherError::validation(
                "Provide either a city name or latitude/longitude coordinates",
            )),
            (false, true) => {
                let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) else {
                    return Err(WeatherError::validation(
                        "latitude and longitude must be provided together",
                    ));
                };
                Self::coordinates(latitude, longitude)
            }
            (true, false) => {
                let city = args.city.as_deref().ok_or_else(|| {
                    WeatherError::validation("city is required when country is given")
                })?;
                let limit = match limit {
                    Some(value) => validate_limit(value)?,
                    None => default_limit,
                };
                Self::city(city, args.country.as_deref(), limit)
            }
        }
    }

    pub fn city(city: &str, country: Option<&str>, limit: u32) -> Result<Self, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::validation("city must not be empty"));
        }

        let country = country.map(normalize_country_code).transpose()?;
        let limit = validate_limit(i64::from(limit))?;

        Ok(Self::City {
            city: city.to_string(),
            country,
            limit,
        })
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::validation(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::validation(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }

        Ok(Self::Coordinates {
            latitude,
            longitude,
        })
    }
}

fn validate_limit(limit: i64) -> Result<u32, WeatherError> {
    u32::try_from(limit)
        .ok()
        .filter(|limit| (1..=MAX_GEOCODE_LIMIT).contains(limit))
        .ok_or_else(|| {
            WeatherError::validation(format!(
                "limit must be between 1 and {MAX_GEOCODE_LIMIT}, got {limit}"
            ))
        })
}

/// Upper-case and check an ISO 3166-1 alpha-2 code. `UK` maps to `GB`.
pub fn normalize_country_code(country: &str) -> Result<String, WeatherError> {
    let code = country.trim().to_ascii_uppercase();
    let code = if code == "UK" { "GB".to_string() } else { code };

    if ISO_COUNTRY_CODES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(WeatherError::validation(format!(
            "country must be a two-letter ISO 3166-1 code (e.g. 'DE', 'US'), got '{country}'"
        )))
    }
}

/// Drop candidates outside `country_code`
pub fn retain_country(candidates: &mut Vec<GeocodeCandidate>, country_code: &str) {
    candidates.retain(|c| c.country_code.eq_ignore_ascii_case(country_code));
}

/// Order candidates most likely first.
///
/// Descending population (absent counts as zero), then candidates in
/// `preferred_country`, then upstream order. The sort is stable.
pub fn rank_candidates(candidates: &mut [GeocodeCandidate], preferred_country: Option<&str>) {
    let preferred = |c: &GeocodeCandidate| {
        preferred_country.is_some_and(|code| c.country_code.eq_ignore_ascii_case(code))
    };

    candidates.sort_by(|a, b| {
        b.population
            .unwrap_or(0)
            .cmp(&a.population.unwrap_or(0))
            .then_with(|| preferred(b).cmp(&preferred(a)))
    });
}

/// "{name}, {admin1}, {country}", skipping blank parts and a region that
/// repeats the place name
pub fn display_name(candidate: &GeocodeCandidate) -> String {
    let name = candidate.name.trim();
    let mut parts = vec![name];

    if let Some(region) = candidate.admin1.as_deref().map(str::trim) {
        if !region.is_empty() && region != name {
            parts.push(region);
        }
    }

    let country = candidate.country.trim();
    if !country.is_empty() {
        parts.push(country);
    }

    parts.join(", ")
}

impl ResolvedLocation {
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            display_name: format!("{latitude:.4}, {longitude:.4}"),
            country: None,
            resolved_from: ResolutionSource::Coordinates,
        }
    }

    /// Map a geocoder candidate, rejecting ones that break location invariants
    pub fn from_candidate(candidate: &GeocodeCandidate) -> Result<Self, WeatherError> {
        if candidate.name.trim().is_empty() {
            return Err(WeatherError::upstream("Geocoding returned a place without a name"));
        }
        if !(-90.0..=90.0).contains(&candidate.latitude)
            || !(-180.0..=180.0).contains(&candidate.longitude)
        {
            return Err(WeatherError::upstream(format!(
                "Geocoding returned invalid coordinates for '{}': {}, {}",
                candidate.name, candidate.latitude, candidate.longitude
            )));
        }

        let country = Some(candidate.country.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            display_name: display_name(candidate),
            country,
            resolved_from: ResolutionSource::Geocoded,
        })
    }
}

/// Turns location queries into a single point using the geocoder
#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: OpenMeteoClient,
    preferred_country: Option<String>,
}

impl LocationResolver {
    pub fn new(client: OpenMeteoClient, preferred_country: Option<String>) -> Self {
        Self {
            client,
            preferred_country,
        }
    }

    /// Geocode a city and return every usable candidate, most likely first
    pub async fn search(
        &self,
        city: &str,
        country: Option<&str>,
        limit: u32,
    ) -> Result<Vec<GeocodeCandidate>, WeatherError> {
        let mut candidates = self.client.search(city, limit, country).await?;
        let received = candidates.len();

        if let Some(code) = country {
            retain_country(&mut candidates, code);
            if candidates.len() < received {
                tracing::debug!(
                    "Dropped {} candidate(s) for '{}' outside {}",
                    received - candidates.len(),
                    city,
                    code
                );
            }
        }

        rank_candidates(&mut candidates, self.preferred_country.as_deref());

        Ok(candidates)
    }

    /// Resolve a query to a single location
    pub async fn resolve(&self, query: &LocationQuery) -> Result<ResolvedLocation, WeatherError> {
        self.resolve_with_candidates(query).await.map(|(loc, _)| loc)
    }

    /// Resolve a query, also returning the ranked candidates it was chosen from
    pub async fn resolve_with_candidates(
        &self,
        query: &LocationQuery,
    ) -> Result<(ResolvedLocation, Vec<GeocodeCandidate>), WeatherError> {
        match query {
            LocationQuery::Coordinates {
                latitude,
                longitude,
            } => Ok((
                ResolvedLocation::from_coordinates(*latitude, *longitude),
                Vec::new(),
            )),
            LocationQuery::City {
                city,
                country,
                limit,
            } => {
                let candidates = self.search(city, country.as_deref(), *limit).await?;

                let best = candidates.first().ok_or_else(|| match country {
                    Some(code) => WeatherError::not_found(format!(
                        "No location found for '{city}' in country '{code}'"
                    )),
                    None => WeatherError::not_found(format!("No location found for '{city}'")),
                })?;
                let resolved = ResolvedLocation::from_candidate(best)?;

                tracing::debug!(
                    "Resolved '{}' to {} ({:.4}, {:.4}) out of {} candidate(s)",
                    city,
                    resolved.display_name,
                    resolved.latitude,
                    resolved.longitude,
                    candidates.len()
                );

                Ok((resolved, candidates))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, country_code: &str, population: Option<u64>) -> GeocodeCandidate {
        GeocodeCandidate {
            name: name.to_string(),
            country: format!("Country {country_code}"),
            country_code: country_code.to_string(),
            admin1: None,
            latitude: 10.0,
            longitude: 20.0,
            population,
            timezone: "UTC".to_string(),
        }
    }

    fn args(
        city: Option<&str>,
        country: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> LocationArgs {
        LocationArgs {
            city: city.map(str::to_string),
            country: country.map(str::to_string),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn ranks_by_population_descending() {
        let mut candidates = vec![
            candidate("Springfield", "US", Some(60_000)),
            candidate("Springfield", "US", Some(167_000)),
            candidate("Springfield", "AU", None),
            candidate("Springfield", "US", Some(116_000)),
        ];
        rank_candidates(&mut candidates, None);

        let populations: Vec<_> = candidates.iter().map(|c| c.population).collect();
        assert_eq!(
            populations,
            vec![Some(167_000), Some(116_000), Some(60_000), None]
        );
    }

    #[test]
    fn equal_population_keeps_upstream_order() {
        let mut candidates = vec![
            candidate("Newport", "GB", None),
            candidate("Newport", "US", None),
            candidate("Newport", "AU", Some(0)),
        ];
        rank_candidates(&mut candidates, None);

        let codes: Vec<_> = candidates.iter().map(|c| c.country_code.as_str()).collect();
        assert_eq!(codes, vec!["GB", "US", "AU"]);
    }

    #[test]
    fn equal_population_prefers_configured_country() {
        let mut candidates = vec![
            candidate("Newport", "GB", Some(500)),
            candidate("Newport", "US", Some(500)),
            candidate("Newport", "AU", Some(900)),
        ];
        rank_candidates(&mut candidates, Some("US"));

        let codes: Vec<_> = candidates.iter().map(|c| c.country_code.as_str()).collect();
        assert_eq!(codes, vec!["AU", "US", "GB"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let original = vec![
            candidate("Paris", "FR", Some(100)),
            candidate("Paris", "US", Some(100)),
            candidate("Paris", "CA", Some(100)),
        ];
        let mut first = original.clone();
        let mut second = original.clone();
        rank_candidates(&mut first, None);
        rank_candidates(&mut second, None);
        assert_eq!(first, second);
    }

    #[test]
    fn retain_country_is_case_insensitive() {
        let mut candidates = vec![
            candidate("London", "GB", Some(8_000_000)),
            candidate("London", "CA", Some(380_000)),
            candidate("London", "gb", Some(1)),
        ];
        retain_country(&mut candidates, "GB");
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.country_code.eq_ignore_ascii_case("GB")));
    }

    #[test]
    fn display_name_includes_region_and_country() {
        let mut london = candidate("London", "CA", None);
        london.admin1 = Some("Ontario".to_string());
        london.country = "Canada".to_string();
        assert_eq!(display_name(&london), "London, Ontario, Canada");

        let mut berlin = candidate("Berlin", "DE", None);
        berlin.admin1 = Some("Berlin".to_string());
        berlin.country = "Germany".to_string();
        assert_eq!(display_name(&berlin), "Berlin, Germany");

        let mut bare = candidate("Nowhere", "", None);
        bare.country = String::new();
        assert_eq!(display_name(&bare), "Nowhere");
    }

    #[test]
    fn coordinates_resolve_without_lookup() {
        let loc = ResolvedLocation::from_coordinates(52.52, 13.41);
        assert_eq!(loc.display_name, "52.5200, 13.4100");
        assert_eq!(loc.resolved_from, ResolutionSource::Coordinates);
        assert!(loc.country.is_none());
    }

    #[test]
    fn candidate_with_bad_coordinates_is_upstream_error() {
        let mut bad = candidate("Bogus", "US", None);
        bad.latitude = 123.0;
        assert!(matches!(
            ResolvedLocation::from_candidate(&bad),
            Err(WeatherError::Upstream(_))
        ));
    }

    #[test]
    fn query_requires_exactly_one_form() {
        let both = args(Some("Berlin"), None, Some(52.5), Some(13.4));
        assert!(matches!(
            LocationQuery::from_args(&both, None, 5),
            Err(WeatherError::Validation(_))
        ));

        let neither = args(None, None, None, None);
        assert!(matches!(
            LocationQuery::from_args(&neither, None, 5),
            Err(WeatherError::Validation(_))
        ));

        let country_only = args(None, Some("DE"), None, None);
        assert!(matches!(
            LocationQuery::from_args(&country_only, None, 5),
            Err(WeatherError::Validation(_))
        ));

        let half_point = args(None, None, Some(52.5), None);
        assert!(matches!(
            LocationQuery::from_args(&half_point, None, 5),
            Err(WeatherError::Validation(_))
        ));
    }

    #[test]
    fn query_validates_ranges() {
        assert!(LocationQuery::coordinates(90.0, -180.0).is_ok());
        assert!(LocationQuery::coordinates(90.1, 0.0).is_err());
        assert!(LocationQuery::coordinates(0.0, 180.5).is_err());
        assert!(LocationQuery::coordinates(f64::NAN, 0.0).is_err());

        let city = args(Some("Berlin"), None, None, None);
        assert!(LocationQuery::from_args(&city, Some(0), 5).is_err());
        assert!(LocationQuery::from_args(&city, Some(101), 5).is_err());
        assert!(LocationQuery::from_args(&city, Some(-3), 5).is_err());
        assert_eq!(
            LocationQuery::from_args(&city, None, 5).unwrap(),
            LocationQuery::City {
                city: "Berlin".to_string(),
                country: None,
                limit: 5
            }
        );
    }

    #[test]
    fn query_rejects_blank_city_and_unknown_country() {
        assert!(LocationQuery::city("   ", None, 5).is_err());
        assert!(LocationQuery::city("London", Some("England"), 5).is_err());
        assert!(LocationQuery::city("London", Some("ZZ"), 5).is_err());
    }

    #[test]
    fn query_normalises_country() {
        let query = LocationQuery::city(" London ", Some("uk"), 5).unwrap();
        assert_eq!(
            query,
            LocationQuery::City {
                city: "London".to_string(),
                country: Some("GB".to_string()),
                limit: 5
            }
        );
    }
}
