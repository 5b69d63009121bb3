//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, working_hours};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Working Hours API",
        version = "0.1.0",
        description = "Weekly availability, date overrides and availability resolution"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Working hours
        working_hours::get_my_working_hours,
        working_hours::put_my_working_hours,
        working_hours::get_availability,
        working_hours::get_calendar,
        working_hours::check_booking,
    ),
    components(
        schemas(
            health::HealthResponse,
            working_hours::AvailabilityQuery,
            working_hours::CalendarQuery,
            working_hours::AvailabilityResponse,
            crate::models::working_hours::ScheduleDocument,
            crate::models::working_hours::WeeklyDayRecord,
            crate::models::working_hours::DateOverrideRecord,
            crate::models::working_hours::ValidationIssue,
            crate::models::availability::ClosedReason,
            crate::models::availability::BookingRequest,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "working-hours", description = "Working hours and availability")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
