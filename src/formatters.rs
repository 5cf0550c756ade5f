use crate::models::{
    AirQualityReport, CurrentWeatherReport, ForecastPeriods, ForecastReport, GeocodeReport,
    PollenReport,
};

/// Formats geocoding candidates into a human-readable string
pub fn format_geocode(report: &GeocodeReport) -> String {
    let mut output = format!(
        "Resolved location: {} ({:.4}, {:.4})\n",
        report.resolved.display_name, report.resolved.latitude, report.resolved.longitude
    );

    if report.candidates.is_empty() {
        return output;
    }

    output.push_str("\nCandidates (most likely first):\n");
    for (i, candidate) in report.candidates.iter().enumerate() {
        let population = candidate
            .population
            .map_or_else(|| "unknown".to_string(), |p| p.to_string());
        output.push_str(&format!(
            "{}. {}{}, {} [{}] ({:.4}, {:.4}) population: {}\n",
            i + 1,
            candidate.name,
            candidate
                .admin1
                .as_deref()
                .map(|region| format!(", {region}"))
                .unwrap_or_default(),
            candidate.country,
            candidate.country_code,
            candidate.latitude,
            candidate.longitude,
            population
        ));
    }
    output
}

/// Formats current conditions into a human-readable string
pub fn format_current(report: &CurrentWeatherReport) -> String {
    let c = &report.current;
    let u = &report.units;
    format!(
        "Current Weather for {}\nTime: {} ({})\n\n  Temperature: {:.1}{} (feels like {:.1}{})\n  Conditions: {}\n  Humidity: {:.0}%\n  Wind: {:.1} {} {}\n  Pressure: {:.2} {}\n  Precipitation: {:.2} {}\n",
        report.location.display_name,
        c.time,
        report.timezone,
        c.temperature,
        u.temperature,
        c.feels_like,
        u.temperature,
        c.weather_description,
        c.humidity,
        c.wind_speed,
        u.wind_speed,
        c.wind_direction_compass,
        c.pressure,
        u.pressure,
        c.precipitation,
        u.precipitation
    )
}

/// Formats a daily or hourly forecast into a human-readable string
pub fn format_forecast(report: &ForecastReport) -> String {
    let u = &report.units;
    let mut output = format!(
        "Weather Forecast for {}\nLocation: {:.4}, {:.4}\nTimezone: {}\n\n",
        report.location.display_name,
        report.location.latitude,
        report.location.longitude,
        report.timezone
    );

    match &report.forecast {
        ForecastPeriods::Daily(days) => {
            for day in days {
                output.push_str(&format!(
                    "{}:\n  Temperature: {:.1}{} - {:.1}{}\n  Conditions: {}\n  Wind Speed: {:.1} {}\n  Precipitation: {:.1} {}{}\n  Sunrise/Sunset: {} / {}\n\n",
                    day.date,
                    day.temperature_min,
                    u.temperature,
                    day.temperature_max,
                    u.temperature,
                    day.weather_description,
                    day.wind_speed_max,
                    u.wind_speed,
                    day.precipitation_sum,
                    u.precipitation,
                    day.precipitation_probability
                        .map(|p| format!(" ({p:.0}% chance)"))
                        .unwrap_or_default(),
                    day.sunrise,
                    day.sunset
                ));
            }
        }
        ForecastPeriods::Hourly(hours) => {
            for hour in hours {
                output.push_str(&format!(
                    "{}: {:.1}{}, {}, wind {:.1} {}, precipitation {:.1} {}\n",
                    hour.time,
                    hour.temperature,
                    u.temperature,
                    hour.weather_description,
                    hour.wind_speed,
                    u.wind_speed,
                    hour.precipitation,
                    u.precipitation
                ));
            }
        }
    }
    output
}

/// Formats air quality data into a human-readable string
pub fn format_air_quality(report: &AirQualityReport) -> String {
    let aq = &report.air_quality;
    let value = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"));
    let index = |v: Option<u32>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());

    let mut output = format!(
        "Air Quality for {}\nTime: {} ({})\n\n  US AQI: {} ({})\n  European AQI: {} ({})\n\nPollutants (µg/m³):\n  PM2.5: {}\n  PM10: {}\n  Ozone: {}\n  NO2: {}\n  SO2: {}\n  CO: {}\n",
        report.location.display_name,
        aq.time,
        report.timezone,
        index(aq.us_aqi.value),
        aq.us_aqi.category,
        index(aq.european_aqi.value),
        aq.european_aqi.category,
        value(aq.pollutants.pm2_5),
        value(aq.pollutants.pm10),
        value(aq.pollutants.ozone),
        value(aq.pollutants.nitrogen_dioxide),
        value(aq.pollutants.sulphur_dioxide),
        value(aq.pollutants.carbon_monoxide)
    );

    match &aq.pollen {
        Some(PollenReport::Measured(p)) => output.push_str(&format!(
            "\nPollen (grains/m³):\n  Alder: {}\n  Birch: {}\n  Grass: {}\n  Mugwort: {}\n  Olive: {}\n  Ragweed: {}\n",
            value(p.alder),
            value(p.birch),
            value(p.grass),
            value(p.mugwort),
            value(p.olive),
            value(p.ragweed)
        )),
        Some(PollenReport::UnsupportedRegion) => output.push_str(
            "\nPollen: not measured here (pollen forecasts only cover Europe)\n",
        ),
        None => {}
    }
    output
}

/// Converts WMO weather code to human-readable description
pub fn weather_code_to_description(code: i32) -> String {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return format!("Unknown ({code})"),
    };
    description.to_string()
}

/// US EPA AQI category
pub fn us_aqi_category(aqi: u32) -> &'static str {
    match aqi {
        0..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        201..=300 => "Very Unhealthy",
        301..=500 => "Hazardous",
        _ => "Unknown",
    }
}

/// European AQI category
pub fn eu_aqi_category(aqi: u32) -> &'static str {
    match aqi {
        0..=20 => "Good",
        21..=40 => "Fair",
        41..=60 => "Moderate",
        61..=80 => "Poor",
        81..=100 => "Very Poor",
        _ => "Extremely Poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ResolvedLocation;
    use crate::models::{AirQualityReading, AqiValue, ForecastHour, Pollutants};
    use crate::units::UnitSystem;

    #[test]
    fn weather_codes() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(48), "Depositing rime fog");
        assert_eq!(weather_code_to_description(75), "Heavy snow fall");
        assert_eq!(weather_code_to_description(99), "Thunderstorm with heavy hail");
        assert_eq!(weather_code_to_description(42), "Unknown (42)");
    }

    #[test]
    fn us_aqi_boundaries() {
        assert_eq!(us_aqi_category(0), "Good");
        assert_eq!(us_aqi_category(50), "Good");
        assert_eq!(us_aqi_category(51), "Moderate");
        assert_eq!(us_aqi_category(150), "Unhealthy for Sensitive Groups");
        assert_eq!(us_aqi_category(200), "Unhealthy");
        assert_eq!(us_aqi_category(300), "Very Unhealthy");
        assert_eq!(us_aqi_category(500), "Hazardous");
        assert_eq!(us_aqi_category(501), "Unknown");
    }

    #[test]
    fn eu_aqi_boundaries() {
        assert_eq!(eu_aqi_category(20), "Good");
        assert_eq!(eu_aqi_category(21), "Fair");
        assert_eq!(eu_aqi_category(60), "Moderate");
        assert_eq!(eu_aqi_category(80), "Poor");
        assert_eq!(eu_aqi_category(100), "Very Poor");
        assert_eq!(eu_aqi_category(140), "Extremely Poor");
    }

    #[test]
    fn hourly_forecast_text_uses_unit_labels() {
        let report = ForecastReport {
            location: ResolvedLocation::from_coordinates(25.77, -80.19),
            timezone: "America/New_York".to_string(),
            units: UnitSystem::Imperial.labels(),
            forecast: ForecastPeriods::Hourly(vec![ForecastHour {
                time: "2024-01-15T00:00".to_string(),
                temperature: 71.6,
                precipitation_probability: Some(10.0),
                precipitation: 0.0,
                weather_code: 1,
                weather_description: "Mainly clear".to_string(),
                wind_speed: 9.3,
            }]),
        };

        let text = format_forecast(&report);
        assert!(text.contains("25.7700, -80.1900"));
        assert!(text.contains("2024-01-15T00:00: 71.6°F, Mainly clear, wind 9.3 mph"));
    }

    #[test]
    fn air_quality_text_explains_missing_pollen() {
        let report = AirQualityReport {
            location: ResolvedLocation::from_coordinates(33.45, -112.07),
            timezone: "America/Phoenix".to_string(),
            air_quality: AirQualityReading {
                time: "2024-01-15T14:00".to_string(),
                us_aqi: AqiValue { value: Some(42), category: "Good" },
                european_aqi: AqiValue { value: None, category: "Unknown" },
                pollutants: Pollutants {
                    pm2_5: Some(8.1),
                    pm10: None,
                    ozone: Some(60.0),
                    nitrogen_dioxide: Some(15.2),
                    sulphur_dioxide: Some(2.1),
                    carbon_monoxide: Some(210.0),
                },
                pollen: Some(PollenReport::UnsupportedRegion),
            },
        };

        let text = format_air_quality(&report);
        assert!(text.contains("US AQI: 42 (Good)"));
        assert!(text.contains("European AQI: n/a (Unknown)"));
        assert!(text.contains("PM10: n/a"));
        assert!(text.contains("Pollen: not measured here"));
    }
}
