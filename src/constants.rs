/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("mcp-open-meteo/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo geocoding search endpoint
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Open-Meteo weather forecast endpoint
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo air quality endpoint
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

pub const DEFAULT_GEOCODE_LIMIT: u32 = 5;
pub const DEFAULT_RESOLVE_LIMIT: u32 = 10;
pub const MAX_GEOCODE_LIMIT: u32 = 100;

pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const MAX_FORECAST_DAYS: u8 = 16;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "weather_code",
    "wind_speed_10m",
    "wind_direction_10m",
    "pressure_msl",
    "precipitation",
];

pub const DAILY_FIELDS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "precipitation_sum",
    "precipitation_probability_max",
    "weather_code",
    "sunrise",
    "sunset",
    "wind_speed_10m_max",
];

pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "precipitation_probability",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
];

pub const POLLUTANT_FIELDS: &[&str] = &[
    "us_aqi",
    "european_aqi",
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
];

pub const POLLEN_FIELDS: &[&str] = &[
    "alder_pollen",
    "birch_pollen",
    "grass_pollen",
    "mugwort_pollen",
    "olive_pollen",
    "ragweed_pollen",
];

/// Bounds of the CAMS European domain, the only region with pollen forecasts
pub const POLLEN_LATITUDE_RANGE: (f64, f64) = (30.0, 72.0);
pub const POLLEN_LONGITUDE_RANGE: (f64, f64) = (-25.0, 45.0);

/// ISO 3166-1 alpha-2 country codes
pub const ISO_COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "XK", "YE", "YT", "ZA", "ZM", "ZW",
];
