//! MCP server exposing Open-Meteo weather, forecast, air-quality and geocoding
//! lookups as tools.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod location;
pub mod models;
pub mod service;
pub mod units;
pub mod weather;

pub use crate::config::Config;
pub use crate::error::{ErrorKind, WeatherError};
pub use crate::location::{LocationQuery, LocationResolver, ResolutionSource, ResolvedLocation};
pub use crate::service::Weather;
pub use crate::units::UnitSystem;
