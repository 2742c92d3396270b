use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    ProxyError,
    geocoding::Geocoder,
    location_resolver::{LocationInput, LocationResolver},
    models::{Coordinates, DailyForecast},
    weather::{self, ForecastProvider},
};

pub mod docs;

const FORECAST_FAILED: &str = "Error fetching weather data";
const SEARCH_FAILED: &str = "Error searching coordinates";

/// Collaborators shared by the forecast routes
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<LocationResolver>,
    pub forecasts: Arc<dyn ForecastProvider>,
}

impl AppState {
    pub fn new(geocoder: Arc<dyn Geocoder>, forecasts: Arc<dyn ForecastProvider>) -> Self {
        Self {
            resolver: Arc::new(LocationResolver::new(geocoder, Coordinates::MOSCOW)),
            forecasts,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinatesQuery {
    /// Latitude of the location
    #[param(value_type = Option<f64>)]
    pub lat: Option<String>,
    /// Longitude of the location
    #[param(value_type = Option<f64>)]
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search phrase for location
    #[param(value_type = String)]
    pub search: Option<String>,
    /// Preferred languages for the place lookup, "en, ru" by default
    pub lang: Option<String>,
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// A failed request as seen by the client
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Client errors keep their message; anything else is logged and replaced by `failure_message`
    fn from_error(err: ProxyError, failure_message: &str) -> Self {
        match err {
            ProxyError::Validation { message } => {
                warn!("Rejected request: {}", message);
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message,
                }
            }
            other => {
                error!(stage = other.stage(), error = %other, "{}", failure_message);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: failure_message.to_string(),
                }
            }
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/weatherBySearch", get(get_weather_by_search))
        .with_state(state)
        .merge(docs::swagger_ui())
}

/// Returns the weather for a given coordinates (or for Moscow if no coordinates provided)
/// around 14:00 UTC for max days possible
#[utoipa::path(
    get,
    path = "/weather",
    tag = "weather",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Successful response", body = Vec<DailyForecast>),
        (status = 400, description = "Exactly one of lat, lon was given", body = ErrorBody),
        (status = 500, description = "Upstream or reduction failure", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyForecast>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let input = LocationInput::from_coordinate_params(query.lat.as_deref(), query.lon.as_deref())
        .map_err(|e| ApiError::from_error(e, FORECAST_FAILED))?;

    forecast_for(&state, input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, FORECAST_FAILED))
}

/// Returns the weather for a search string around 14:00 UTC for max days possible
#[utoipa::path(
    get,
    path = "/weatherBySearch",
    tag = "weather",
    params(SearchQuery),
    responses(
        (status = 200, description = "Successful response", body = Vec<DailyForecast>),
        (status = 400, description = "search was not provided", body = ErrorBody),
        (status = 500, description = "Geocoding, upstream or reduction failure", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
async fn get_weather_by_search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyForecast>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let input = LocationInput::from_search_params(query.search.as_deref(), query.lang.as_deref())
        .map_err(|e| ApiError::from_error(e, SEARCH_FAILED))?;

    forecast_for(&state, input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, SEARCH_FAILED))
}

async fn forecast_for(state: &AppState, input: LocationInput) -> crate::Result<Vec<DailyForecast>> {
    let coordinates = state.resolver.resolve(input).await?;
    weather::daily_forecast(state.forecasts.as_ref(), coordinates).await
}
