//! Builds Open-Meteo queries for a resolved location and maps the responses
//! into tool output, converting units locally.

use crate::client::{OpenMeteoClient, QueryParams};
use crate::constants::{
    CURRENT_FIELDS, DAILY_FIELDS, DEFAULT_FORECAST_DAYS, HOURLY_FIELDS, MAX_FORECAST_DAYS,
    POLLEN_FIELDS, POLLEN_LATITUDE_RANGE, POLLEN_LONGITUDE_RANGE, POLLUTANT_FIELDS,
};
use crate::error::WeatherError;
use crate::formatters::{eu_aqi_category, us_aqi_category, weather_code_to_description};
use crate::location::ResolvedLocation;
use crate::models::{
    AirQualityData, AirQualityReading, AirQualityReport, AirQualityResponse, AqiValue,
    CurrentData, CurrentWeatherReport, DailyData, ForecastDay, ForecastHour, ForecastPeriods,
    ForecastReport, ForecastResponse, HourlyData, PollenLevels, PollenReport, Pollutants,
    WeatherReading,
};
use crate::units::{degrees_to_compass, UnitSystem};

/// Number of forecast days, always within 1..=16
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDays(u8);

impl ForecastDays {
    pub fn new(days: i64) -> Result<Self, WeatherError> {
        u8::try_from(days)
            .ok()
            .filter(|d| (1..=MAX_FORECAST_DAYS).contains(d))
            .map(Self)
            .ok_or_else(|| {
                WeatherError::validation(format!(
                    "days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
                ))
            })
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for ForecastDays {
    fn default() -> Self {
        Self(DEFAULT_FORECAST_DAYS)
    }
}

/// Whether pollen is forecast for this point
pub fn in_pollen_coverage(loc: &ResolvedLocation) -> bool {
    let (lat_min, lat_max) = POLLEN_LATITUDE_RANGE;
    let (lon_min, lon_max) = POLLEN_LONGITUDE_RANGE;
    (lat_min..=lat_max).contains(&loc.latitude) && (lon_min..=lon_max).contains(&loc.longitude)
}

fn base_params(loc: &ResolvedLocation) -> QueryParams {
    vec![
        ("latitude", loc.latitude.to_string()),
        ("longitude", loc.longitude.to_string()),
        ("timezone", "auto".to_string()),
    ]
}

pub fn current_params(loc: &ResolvedLocation) -> QueryParams {
    let mut params = base_params(loc);
    params.push(("current", CURRENT_FIELDS.join(",")));
    params
}

pub fn forecast_params(loc: &ResolvedLocation, days: ForecastDays, hourly: bool) -> QueryParams {
    let mut params = base_params(loc);
    params.push(("forecast_days", days.get().to_string()));
    if hourly {
        params.push(("hourly", HOURLY_FIELDS.join(",")));
    } else {
        params.push(("daily", DAILY_FIELDS.join(",")));
    }
    params
}

/// Pollen fields are only requested inside the coverage region
pub fn air_quality_params(loc: &ResolvedLocation, include_pollen: bool) -> QueryParams {
    let mut fields: Vec<&str> = POLLUTANT_FIELDS.to_vec();
    if include_pollen && in_pollen_coverage(loc) {
        fields.extend_from_slice(POLLEN_FIELDS);
    }

    let mut params = base_params(loc);
    params.push(("current", fields.join(",")));
    params
}

pub fn current_reading(current: &CurrentData, units: UnitSystem) -> WeatherReading {
    WeatherReading {
        time: current.time.clone(),
        temperature: units.temperature(current.temperature),
        feels_like: units.temperature(current.feels_like),
        humidity: current.humidity,
        weather_code: current.weather_code,
        weather_description: weather_code_to_description(current.weather_code),
        wind_speed: units.speed(current.wind_speed),
        wind_direction: current.wind_direction,
        wind_direction_compass: degrees_to_compass(current.wind_direction),
        pressure: units.pressure(current.pressure),
        precipitation: units.precipitation(current.precipitation),
    }
}

/// Every column must line up with the `time` column
fn check_column<T>(
    block: &str,
    column: &str,
    values: &[T],
    expected: usize,
) -> Result<(), WeatherError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(WeatherError::upstream(format!(
            "Malformed forecast response: {block}.{column} has {} entries, expected {expected}",
            values.len()
        )))
    }
}

/// Keep only the time of day from an ISO-8601 local timestamp
fn time_of_day(timestamp: &str) -> String {
    timestamp
        .split_once('T')
        .map_or(timestamp, |(_, time)| time)
        .to_string()
}

pub fn forecast_days(
    daily: &DailyData,
    units: UnitSystem,
) -> Result<Vec<ForecastDay>, WeatherError> {
    let n = daily.time.len();
    check_column("daily", "temperature_2m_max", &daily.temperature_max, n)?;
    check_column("daily", "temperature_2m_min", &daily.temperature_min, n)?;
    check_column("daily", "apparent_temperature_max", &daily.feels_like_max, n)?;
    check_column("daily", "apparent_temperature_min", &daily.feels_like_min, n)?;
    check_column("daily", "precipitation_sum", &daily.precipitation_sum, n)?;
    check_column(
        "daily",
        "precipitation_probability_max",
        &daily.precipitation_probability_max,
        n,
    )?;
    check_column("daily", "weather_code", &daily.weather_code, n)?;
    check_column("daily", "sunrise", &daily.sunrise, n)?;
    check_column("daily", "sunset", &daily.sunset, n)?;
    check_column("daily", "wind_speed_10m_max", &daily.wind_speed_max, n)?;

    Ok((0..n)
        .map(|i| ForecastDay {
            date: daily.time[i].clone(),
            temperature_max: units.temperature(daily.temperature_max[i]),
            temperature_min: units.temperature(daily.temperature_min[i]),
            feels_like_max: units.temperature(daily.feels_like_max[i]),
            feels_like_min: units.temperature(daily.feels_like_min[i]),
            precipitation_sum: units.precipitation(daily.precipitation_sum[i]),
            precipitation_probability: daily.precipitation_probability_max[i],
            weather_code: daily.weather_code[i],
            weather_description: weather_code_to_description(daily.weather_code[i]),
            sunrise: time_of_day(&daily.sunrise[i]),
            sunset: time_of_day(&daily.sunset[i]),
            wind_speed_max: units.speed(daily.wind_speed_max[i]),
        })
        .collect())
}

pub fn forecast_hours(
    hourly: &HourlyData,
    units: UnitSystem,
) -> Result<Vec<ForecastHour>, WeatherError> {
    let n = hourly.time.len();
    check_column("hourly", "temperature_2m", &hourly.temperature, n)?;
    check_column(
        "hourly",
        "precipitation_probability",
        &hourly.precipitation_probability,
        n,
    )?;
    check_column("hourly", "precipitation", &hourly.precipitation, n)?;
    check_column("hourly", "weather_code", &hourly.weather_code, n)?;
    check_column("hourly", "wind_speed_10m", &hourly.wind_speed, n)?;

    Ok((0..n)
        .map(|i| ForecastHour {
            time: hourly.time[i].clone(),
            temperature: units.temperature(hourly.temperature[i]),
            precipitation_probability: hourly.precipitation_probability[i],
            precipitation: units.precipitation(hourly.precipitation[i]),
            weather_code: hourly.weather_code[i],
            weather_description: weather_code_to_description(hourly.weather_code[i]),
            wind_speed: units.speed(hourly.wind_speed[i]),
        })
        .collect())
}

fn aqi(value: Option<f64>, category: fn(u32) -> &'static str) -> AqiValue {
    let value = value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32);
    AqiValue {
        value,
        category: value.map_or("Unknown", category),
    }
}

pub fn air_quality_reading(
    current: &AirQualityData,
    loc: &ResolvedLocation,
    include_pollen: bool,
) -> AirQualityReading {
    let pollen = include_pollen.then(|| {
        if in_pollen_coverage(loc) {
            PollenReport::Measured(PollenLevels {
                alder: current.alder_pollen,
                birch: current.birch_pollen,
                grass: current.grass_pollen,
                mugwort: current.mugwort_pollen,
                olive: current.olive_pollen,
                ragweed: current.ragweed_pollen,
            })
        } else {
            PollenReport::UnsupportedRegion
        }
    });

    AirQualityReading {
        time: current.time.clone(),
        us_aqi: aqi(current.us_aqi, us_aqi_category),
        european_aqi: aqi(current.european_aqi, eu_aqi_category),
        pollutants: Pollutants {
            pm2_5: current.pm2_5,
            pm10: current.pm10,
            ozone: current.ozone,
            nitrogen_dioxide: current.nitrogen_dioxide,
            sulphur_dioxide: current.sulphur_dioxide,
            carbon_monoxide: current.carbon_monoxide,
        },
        pollen,
    }
}

fn missing_block(block: &str) -> WeatherError {
    WeatherError::upstream(format!("Malformed forecast response: missing '{block}' block"))
}

/// Fetches weather and air-quality data for already-resolved locations
#[derive(Debug, Clone)]
pub struct WeatherQueryBuilder {
    client: OpenMeteoClient,
}

impl WeatherQueryBuilder {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }

    pub async fn build_current(
        &self,
        loc: ResolvedLocation,
        units: UnitSystem,
    ) -> Result<CurrentWeatherReport, WeatherError> {
        let response = self.client.forecast(&current_params(&loc)).await?;
        let current = response.current.as_ref().ok_or_else(|| missing_block("current"))?;

        Ok(CurrentWeatherReport {
            current: current_reading(current, units),
            units: units.labels(),
            timezone: response.timezone,
            location: loc,
        })
    }

    pub async fn build_forecast(
        &self,
        loc: ResolvedLocation,
        units: UnitSystem,
        days: ForecastDays,
        hourly: bool,
    ) -> Result<ForecastReport, WeatherError> {
        let response: ForecastResponse =
            self.client.forecast(&forecast_params(&loc, days, hourly)).await?;

        let forecast = if hourly {
            let block = response.hourly.as_ref().ok_or_else(|| missing_block("hourly"))?;
            ForecastPeriods::Hourly(forecast_hours(block, units)?)
        } else {
            let block = response.daily.as_ref().ok_or_else(|| missing_block("daily"))?;
            ForecastPeriods::Daily(forecast_days(block, units)?)
        };

        Ok(ForecastReport {
            forecast,
            units: units.labels(),
            timezone: response.timezone,
            location: loc,
        })
    }

    pub async fn build_air_quality(
        &self,
        loc: ResolvedLocation,
        include_pollen: bool,
    ) -> Result<AirQualityReport, WeatherError> {
        let response: AirQualityResponse = self
            .client
            .air_quality(&air_quality_params(&loc, include_pollen))
            .await?;

        Ok(AirQualityReport {
            air_quality: air_quality_reading(&response.current, &loc, include_pollen),
            timezone: response.timezone,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ResolutionSource;

    fn located(latitude: f64, longitude: f64) -> ResolvedLocation {
        ResolvedLocation {
            latitude,
            longitude,
            display_name: "Somewhere".to_string(),
            country: None,
            resolved_from: ResolutionSource::Coordinates,
        }
    }

    fn param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    fn daily_block() -> DailyData {
        DailyData {
            time: vec!["2024-01-15".into(), "2024-01-16".into()],
            temperature_max: vec![10.0, 0.0],
            temperature_min: vec![2.0, -5.0],
            feels_like_max: vec![8.0, -2.0],
            feels_like_min: vec![0.0, -9.0],
            precipitation_sum: vec![25.4, 0.0],
            precipitation_probability_max: vec![Some(80.0), None],
            weather_code: vec![61, 0],
            sunrise: vec!["2024-01-15T08:10".into(), "2024-01-16T08:09".into()],
            sunset: vec!["2024-01-15T16:25".into(), "2024-01-16T16:27".into()],
            wind_speed_max: vec![20.0, 10.0],
        }
    }

    #[test]
    fn forecast_days_rejects_out_of_range() {
        for days in [0, 17, -1, 300] {
            assert!(matches!(
                ForecastDays::new(days),
                Err(WeatherError::Validation(_))
            ));
        }
        assert_eq!(ForecastDays::new(1).unwrap().get(), 1);
        assert_eq!(ForecastDays::new(16).unwrap().get(), 16);
        assert_eq!(ForecastDays::default().get(), 7);
    }

    #[test]
    fn forecast_params_select_granularity() {
        let loc = located(25.77, -80.19);
        let days = ForecastDays::new(5).unwrap();

        let hourly = forecast_params(&loc, days, true);
        assert_eq!(param(&hourly, "forecast_days"), Some("5"));
        assert!(param(&hourly, "hourly").is_some());
        assert!(param(&hourly, "daily").is_none());

        let daily = forecast_params(&loc, days, false);
        assert!(param(&daily, "daily").unwrap().contains("sunrise"));
        assert!(param(&daily, "hourly").is_none());
        assert!(param(&daily, "temperature_unit").is_none());
    }

    #[test]
    fn pollen_only_requested_inside_europe() {
        let berlin = located(52.52, 13.41);
        let phoenix = located(33.45, -112.07);

        assert!(in_pollen_coverage(&berlin));
        assert!(!in_pollen_coverage(&phoenix));

        let inside = air_quality_params(&berlin, true);
        assert!(param(&inside, "current").unwrap().contains("birch_pollen"));

        let outside = air_quality_params(&phoenix, true);
        assert!(!param(&outside, "current").unwrap().contains("pollen"));

        let not_asked = air_quality_params(&berlin, false);
        assert!(!param(&not_asked, "current").unwrap().contains("pollen"));
    }

    #[test]
    fn daily_mapping_converts_to_imperial() {
        let days = forecast_days(&daily_block(), UnitSystem::Imperial).unwrap();

        assert_eq!(days.len(), 2);
        assert!((days[0].temperature_max - 50.0).abs() < 1e-9);
        assert!((days[1].temperature_min - 23.0).abs() < 1e-9);
        assert!((days[0].precipitation_sum - 1.00000054).abs() < 1e-6);
        assert_eq!(days[0].sunrise, "08:10");
        assert_eq!(days[1].precipitation_probability, None);
        assert_eq!(days[0].weather_description, "Slight rain");
    }

    #[test]
    fn daily_mapping_rejects_ragged_columns() {
        let mut block = daily_block();
        block.sunset.pop();
        assert!(matches!(
            forecast_days(&block, UnitSystem::Metric),
            Err(WeatherError::Upstream(message)) if message.contains("daily.sunset")
        ));
    }

    #[test]
    fn current_reading_metric_is_untouched() {
        let current = CurrentData {
            time: "2024-01-15T14:00".into(),
            temperature: 5.2,
            humidity: 80.0,
            feels_like: 2.1,
            weather_code: 3,
            wind_speed: 15.5,
            wind_direction: 250.0,
            pressure: 1015.2,
            precipitation: 0.0,
        };
        let reading = current_reading(&current, UnitSystem::Metric);

        assert_eq!(reading.temperature, 5.2);
        assert_eq!(reading.pressure, 1015.2);
        assert_eq!(reading.wind_direction_compass, "WSW");
        assert_eq!(reading.weather_description, "Overcast");
    }

    #[test]
    fn air_quality_marks_unsupported_pollen_region() {
        let data: AirQualityData = serde_json::from_value(serde_json::json!({
            "time": "2024-01-15T14:00",
            "us_aqi": 42,
            "european_aqi": null,
            "pm10": 12.5, "pm2_5": 8.1, "carbon_monoxide": 210.0,
            "nitrogen_dioxide": 15.2, "sulphur_dioxide": 2.1, "ozone": 60.0
        }))
        .unwrap();

        let reading = air_quality_reading(&data, &located(33.45, -112.07), true);
        assert_eq!(reading.pollen, Some(PollenReport::UnsupportedRegion));
        assert_eq!(reading.us_aqi.value, Some(42));
        assert_eq!(reading.us_aqi.category, "Good");
        assert_eq!(reading.european_aqi.value, None);
        assert_eq!(reading.european_aqi.category, "Unknown");

        let without = air_quality_reading(&data, &located(33.45, -112.07), false);
        assert_eq!(without.pollen, None);
    }
}
