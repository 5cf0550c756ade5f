use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::location::ResolvedLocation;
use crate::units::UnitLabels;

// ============================================================================
// Open-Meteo Geocoding API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    /// Absent when nothing matched
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
}

/// One place returned by the geocoder
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeocodeCandidate {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    /// State, province or region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default)]
    pub timezone: String,
}

// ============================================================================
// Open-Meteo Forecast API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub timezone: String,
    pub current: Option<CurrentData>,
    pub daily: Option<DailyData>,
    pub hourly: Option<HourlyData>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentData {
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: f64,
    #[serde(rename = "apparent_temperature")]
    pub feels_like: f64,
    pub weather_code: i32,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: f64,
    #[serde(rename = "pressure_msl")]
    pub pressure: f64,
    pub precipitation: f64,
}

#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<f64>,
    #[serde(rename = "apparent_temperature_max")]
    pub feels_like_max: Vec<f64>,
    #[serde(rename = "apparent_temperature_min")]
    pub feels_like_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub weather_code: Vec<i32>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    #[serde(rename = "wind_speed_10m_max")]
    pub wind_speed_max: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<f64>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<f64>,
    pub weather_code: Vec<i32>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Vec<f64>,
}

// ============================================================================
// Open-Meteo Air Quality API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AirQualityResponse {
    pub timezone: String,
    pub current: AirQualityData,
}

/// Concentrations may be null where the model has no coverage
#[derive(Debug, Deserialize)]
pub struct AirQualityData {
    pub time: String,
    pub us_aqi: Option<f64>,
    pub european_aqi: Option<f64>,
    pub pm10: Option<f64>,
    pub pm2_5: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
    #[serde(default)]
    pub alder_pollen: Option<f64>,
    #[serde(default)]
    pub birch_pollen: Option<f64>,
    #[serde(default)]
    pub grass_pollen: Option<f64>,
    #[serde(default)]
    pub mugwort_pollen: Option<f64>,
    #[serde(default)]
    pub olive_pollen: Option<f64>,
    #[serde(default)]
    pub ragweed_pollen: Option<f64>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

/// Where to look: a city (optionally with country) or a coordinate pair
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct LocationArgs {
    /// City name (e.g. "Berlin", "Springfield"). Omit when passing coordinates.
    pub city: Option<String>,
    /// Two-letter ISO country code used to disambiguate the city (e.g. "DE", "US", "GB").
    pub country: Option<String>,
    /// Latitude in degrees, -90 to 90. Must be paired with longitude.
    pub latitude: Option<f64>,
    /// Longitude in degrees, -180 to 180. Must be paired with latitude.
    pub longitude: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GeocodeRequest {
    #[serde(flatten)]
    pub location: LocationArgs,
    /// Maximum number of candidates to return (1-100, default 5).
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CurrentWeatherRequest {
    #[serde(flatten)]
    pub location: LocationArgs,
    /// "metric" (°C, km/h, hPa, mm) or "imperial" (°F, mph, inHg, in). Defaults to metric.
    pub units: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ForecastRequest {
    #[serde(flatten)]
    pub location: LocationArgs,
    /// "metric" or "imperial". Defaults to metric.
    pub units: Option<String>,
    /// Number of forecast days (1-16, default 7).
    pub days: Option<i64>,
    /// Return hourly records instead of daily aggregates (default false).
    pub hourly: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct AirQualityRequest {
    #[serde(flatten)]
    pub location: LocationArgs,
    /// Include pollen counts. Only measured inside Europe (default false).
    pub include_pollen: Option<bool>,
}

// ============================================================================
// Tool Output Models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GeocodeReport {
    /// The candidate weather lookups would use
    pub resolved: ResolvedLocation,
    /// Most likely first; empty when coordinates were supplied
    pub candidates: Vec<GeocodeCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub weather_code: i32,
    pub weather_description: String,
    pub wind_speed: f64,
    /// Degrees, meteorological convention
    pub wind_direction: f64,
    pub wind_direction_compass: &'static str,
    pub pressure: f64,
    pub precipitation: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeatherReport {
    pub location: ResolvedLocation,
    pub timezone: String,
    pub units: UnitLabels,
    pub current: WeatherReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: String,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub feels_like_max: f64,
    pub feels_like_min: f64,
    pub precipitation_sum: f64,
    /// Percent; null when the provider has no probability for that day
    pub precipitation_probability: Option<f64>,
    pub weather_code: i32,
    pub weather_description: String,
    /// Local time of day (HH:MM)
    pub sunrise: String,
    pub sunset: String,
    pub wind_speed_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastHour {
    pub time: String,
    pub temperature: f64,
    pub precipitation_probability: Option<f64>,
    pub precipitation: f64,
    pub weather_code: i32,
    pub weather_description: String,
    pub wind_speed: f64,
}

/// Daily aggregates or hourly records, chosen by the `hourly` flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "granularity", content = "periods", rename_all = "snake_case")]
pub enum ForecastPeriods {
    Daily(Vec<ForecastDay>),
    Hourly(Vec<ForecastHour>),
}

impl ForecastPeriods {
    pub fn len(&self) -> usize {
        match self {
            ForecastPeriods::Daily(days) => days.len(),
            ForecastPeriods::Hourly(hours) => hours.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub location: ResolvedLocation,
    pub timezone: String,
    pub units: UnitLabels,
    pub forecast: ForecastPeriods,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiValue {
    pub value: Option<u32>,
    pub category: &'static str,
}

/// Concentrations in µg/m³
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pollutants {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub ozone: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub carbon_monoxide: Option<f64>,
}

/// Pollen counts in grains/m³
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollenLevels {
    pub alder: Option<f64>,
    pub birch: Option<f64>,
    pub grass: Option<f64>,
    pub mugwort: Option<f64>,
    pub olive: Option<f64>,
    pub ragweed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollenReport {
    Measured(PollenLevels),
    /// The location lies outside the provider's pollen coverage
    UnsupportedRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReading {
    pub time: String,
    pub us_aqi: AqiValue,
    pub european_aqi: AqiValue,
    pub pollutants: Pollutants,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollen: Option<PollenReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirQualityReport {
    pub location: ResolvedLocation,
    pub timezone: String,
    pub air_quality: AirQualityReading,
}
