//! Route definitions

use axum::{
    Router,
    handler::Handler,
    middleware,
    routing::{MethodRouter, get},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::panic_response;
use crate::middleware::{ParamSet, validate_params};
use crate::{handlers, state::AppState};

/// GET route whose parameters are checked against `params` first
fn validated<H, T>(handler: H, params: &'static ParamSet) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).route_layer(middleware::from_fn_with_state(params, validate_params))
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    use handlers::{geocoding, transit, weather};

    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Weather API (v1)
        .route(
            "/v1/weather/current",
            validated(weather::current, &weather::CURRENT_PARAMS),
        )
        .route(
            "/v1/weather/forecast",
            validated(weather::forecast, &weather::FORECAST_PARAMS),
        )
        .route(
            "/v1/weather/hourly",
            validated(weather::hourly, &weather::HOURLY_PARAMS),
        )
        .route(
            "/v1/weather/icons/{icon}",
            validated(weather::icon, &weather::ICON_PARAMS),
        )
        // Transit API (v1)
        .route(
            "/v1/transit/stations",
            validated(transit::stations, &transit::STATIONS_PARAMS),
        )
        .route(
            "/v1/transit/stations/{stationId}/departures",
            validated(transit::departures, &transit::DEPARTURES_PARAMS),
        )
        .route(
            "/v1/transit/departures",
            validated(transit::departures_by_query, &transit::DEPARTURES_QUERY_PARAMS),
        )
        .route(
            "/v1/transit/connections",
            validated(transit::connections, &transit::CONNECTIONS_PARAMS),
        )
        // Geocoding API (v1)
        .route(
            "/v1/geocoding/search",
            validated(geocoding::search, &geocoding::SEARCH_PARAMS),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
