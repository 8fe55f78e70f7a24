use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

use crate::models::{ApiResponse, DailyEntry, EntryMutationData, PeriodWithEntries, TimesheetPeriod};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weeklog API",
        version = "1.0.0",
        description = "Weekly timesheets: daily entries, totals and manager approval"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Periods
        crate::handlers::periods_handler::list_periods,
        crate::handlers::periods_handler::create_period,
        crate::handlers::periods_handler::get_period,
        crate::handlers::periods_handler::update_period,
        crate::handlers::periods_handler::delete_period,

        // Approvals
        crate::handlers::periods_handler::list_team_periods,
        crate::handlers::periods_handler::submit_period,
        crate::handlers::periods_handler::approve_period,
        crate::handlers::periods_handler::deny_period,

        // Entries
        crate::handlers::entries_handler::list_entries,
        crate::handlers::entries_handler::create_entry,
        crate::handlers::entries_handler::update_entry,
        crate::handlers::entries_handler::delete_entry,
    ),
    components(
        schemas(
            // Core models
            crate::models::TimesheetPeriod,
            crate::models::DailyEntry,
            crate::models::PeriodWithEntries,
            crate::models::EntryMutationData,
            crate::timesheet::TimesheetStatus,
            crate::handlers::health::HealthStatus,

            // Input models
            crate::models::CreatePeriodInput,
            crate::models::UpdatePeriodInput,
            crate::models::ApprovePeriodInput,
            crate::models::DenyPeriodInput,
            crate::models::CreateEntryInput,
            crate::models::UpdateEntryInput,

            // Envelopes
            ApiResponse<TimesheetPeriod>,
            ApiResponse<Vec<TimesheetPeriod>>,
            ApiResponse<PeriodWithEntries>,
            ApiResponse<DailyEntry>,
            ApiResponse<Vec<DailyEntry>>,
            ApiResponse<EntryMutationData>,
            ApiResponse<i32>,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "periods", description = "Weekly timesheet periods"),
        (name = "entries", description = "Daily entries inside a period"),
        (name = "approvals", description = "Submission and manager approval"),
    ),
    modifiers(&SecurityAddon)
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
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("access_token"))),
            );
        }
    }
}
