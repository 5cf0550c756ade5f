use anyhow::Result;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde::Serialize;

use crate::client::OpenMeteoClient;
use crate::config::Config;
use crate::error::WeatherError;
use crate::formatters::{format_air_quality, format_current, format_forecast, format_geocode};
use crate::location::{LocationQuery, LocationResolver};
use crate::models::{
    AirQualityReport, AirQualityRequest, CurrentWeatherReport, CurrentWeatherRequest,
    ForecastReport, ForecastRequest, GeocodeReport, GeocodeRequest,
};
use crate::units::UnitSystem;
use crate::weather::{ForecastDays, WeatherQueryBuilder};

/// Main weather service that handles MCP requests
#[derive(Clone)]
pub struct Weather {
    config: Config,
    resolver: LocationResolver,
    queries: WeatherQueryBuilder,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a new Weather service instance
    pub fn new(config: Config) -> Result<Self> {
        let client = OpenMeteoClient::new(&config)?;

        Ok(Self {
            resolver: LocationResolver::new(client.clone(), config.preferred_country.clone()),
            queries: WeatherQueryBuilder::new(client),
            config,
            tool_router: Self::tool_router(),
        })
    }

    fn units(&self, units: Option<&str>) -> Result<UnitSystem, WeatherError> {
        units.map_or(Ok(self.config.default_units), |u| u.parse::<UnitSystem>())
    }

    /// Look up candidates for a city, or echo back explicit coordinates
    pub async fn lookup(&self, request: GeocodeRequest) -> Result<GeocodeReport, WeatherError> {
        let query =
            LocationQuery::from_args(&request.location, request.limit, self.config.geocode_limit)?;
        let (resolved, candidates) = self.resolver.resolve_with_candidates(&query).await?;

        Ok(GeocodeReport {
            resolved,
            candidates,
        })
    }

    pub async fn current_weather(
        &self,
        request: CurrentWeatherRequest,
    ) -> Result<CurrentWeatherReport, WeatherError> {
        let query =
            LocationQuery::from_args(&request.location, None, self.config.resolve_limit)?;
        let units = self.units(request.units.as_deref())?;

        let loc = self.resolver.resolve(&query).await?;
        self.queries.build_current(loc, units).await
    }

    pub async fn forecast(&self, request: ForecastRequest) -> Result<ForecastReport, WeatherError> {
        let query =
            LocationQuery::from_args(&request.location, None, self.config.resolve_limit)?;
        let units = self.units(request.units.as_deref())?;
        let days = request
            .days
            .map_or(Ok(ForecastDays::default()), ForecastDays::new)?;
        let hourly = request.hourly.unwrap_or(false);

        let loc = self.resolver.resolve(&query).await?;
        self.queries.build_forecast(loc, units, days, hourly).await
    }

    pub async fn air_quality(
        &self,
        request: AirQualityRequest,
    ) -> Result<AirQualityReport, WeatherError> {
        let query =
            LocationQuery::from_args(&request.location, None, self.config.resolve_limit)?;
        let include_pollen = request.include_pollen.unwrap_or(false);

        let loc = self.resolver.resolve(&query).await?;
        self.queries.build_air_quality(loc, include_pollen).await
    }
}

/// Text summary first, then the structured payload
fn tool_result<T: Serialize>(
    outcome: Result<T, WeatherError>,
    format: fn(&T) -> String,
) -> Result<CallToolResult, McpError> {
    let report = outcome.map_err(|e| {
        tracing::warn!("Tool call failed ({:?}): {}", e.kind(), e);
        McpError::from(e)
    })?;

    Ok(CallToolResult::success(vec![
        Content::text(format(&report)),
        Content::json(&report)?,
    ]))
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-open-meteo".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Weather, air quality and geocoding powered by the Open-Meteo API. \
                Tools: geocode, get_current_weather, get_forecast, get_air_quality. \
                Give a location as a city name (optionally with a two-letter country code) \
                or as latitude/longitude. City names resolve to the most populous match."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Weather {
    /// Searches for places by name
    #[tool(description = "Search for locations by city name. Returns candidates sorted by population (most likely first) and the one weather lookups would use. Use it to disambiguate common names such as 'Springfield' or 'London'; pass country (e.g. 'US') to narrow the search.")]
    async fn geocode(
        &self,
        Parameters(request): Parameters<GeocodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Geocoding city: {:?}, country: {:?}, limit: {:?}",
            request.location.city,
            request.location.country,
            request.limit
        );

        tool_result(self.lookup(request).await, format_geocode)
    }

    /// Gets current conditions for a location
    #[tool(description = "Get current weather conditions. Provide either city (optionally with a two-letter country code, e.g. city: 'London', country: 'GB') or latitude and longitude. units: 'metric' (default) or 'imperial'.")]
    async fn get_current_weather(
        &self,
        Parameters(request): Parameters<CurrentWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting current weather for {:?}/{:?} ({:?}, {:?}), units: {:?}",
            request.location.city,
            request.location.country,
            request.location.latitude,
            request.location.longitude,
            request.units
        );

        tool_result(self.current_weather(request).await, format_current)
    }

    /// Gets a daily or hourly forecast for a location
    #[tool(description = "Get a weather forecast for 1-16 days (default 7). Provide either city (optionally with country) or latitude and longitude. Set hourly: true for hourly records instead of daily summaries. units: 'metric' (default) or 'imperial'.")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<ForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting forecast for {:?}/{:?} ({:?}, {:?}), days: {:?}, hourly: {:?}, units: {:?}",
            request.location.city,
            request.location.country,
            request.location.latitude,
            request.location.longitude,
            request.days,
            request.hourly,
            request.units
        );

        tool_result(self.forecast(request).await, format_forecast)
    }

    /// Gets air quality for a location
    #[tool(description = "Get air quality: US and European AQI with categories, and PM2.5, PM10, O3, NO2, SO2 and CO concentrations. Provide either city (optionally with country) or latitude and longitude. include_pollen: true adds pollen counts, which are only measured in Europe.")]
    async fn get_air_quality(
        &self,
        Parameters(request): Parameters<AirQualityRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting air quality for {:?}/{:?} ({:?}, {:?}), pollen: {:?}",
            request.location.city,
            request.location.country,
            request.location.latitude,
            request.location.longitude,
            request.include_pollen
        );

        tool_result(self.air_quality(request).await, format_air_quality)
    }
}
