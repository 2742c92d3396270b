//! OpenAPI document and the Swagger UI served under `/api-docs`

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::ErrorBody;
use crate::models::{DailyForecast, WeatherDetails};

pub const DOCS_PATH: &str = "/api-docs";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather API",
        version = "1.0.0",
        description = "A simple API to fetch weather data"
    ),
    paths(super::get_weather, super::get_weather_by_search),
    components(schemas(DailyForecast, WeatherDetails, ErrorBody)),
    tags((name = "weather", description = "Daily forecasts around 14:00 UTC"))
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_both_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        assert!(paths.contains_key("/weather"));
        assert!(paths.contains_key("/weatherBySearch"));
        assert_eq!(doc["info"]["title"], "Weather API");
    }

    #[test]
    fn test_details_schema_is_documented() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let details = &doc["components"]["schemas"]["WeatherDetails"]["properties"];

        for field in [
            "air_pressure_at_sea_level",
            "air_temperature",
            "cloud_area_fraction",
            "relative_humidity",
            "wind_from_direction",
            "wind_speed",
        ] {
            assert!(details.get(field).is_some(), "missing {field}");
        }
    }
}
