use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedUser,
    models::{ApiResponse, CreateEntryInput, DailyEntry, EntryMutationData, UpdateEntryInput},
    timesheet::EntryMutation,
    AppResult, AppState,
};

fn mutation_response(mutation: EntryMutation, message: &str) -> Json<ApiResponse<EntryMutationData>> {
    let data = EntryMutationData {
        entry: mutation.entry,
        period: mutation.period,
    };
    Json(ApiResponse::ok(data, message).with_warning(mutation.warning))
}

/// GET /api/periods/{id}/entries
#[utoipa::path(
    get,
    path = "/api/periods/{id}/entries",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Live entries ordered by date", body = ApiResponse<Vec<DailyEntry>>),
        (status = 404, description = "Period not found")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<DailyEntry>>>> {
    let entries = state.timesheets.list_entries(auth.user_id, period_id).await?;

    Ok(Json(ApiResponse::ok(entries, "Entries retrieved")))
}

/// POST /api/periods/{id}/entries - Add a day to a draft period
#[utoipa::path(
    post,
    path = "/api/periods/{id}/entries",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    request_body = CreateEntryInput,
    responses(
        (status = 200, description = "Entry created and totals recalculated", body = ApiResponse<EntryMutationData>),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Period is no longer a draft"),
        (status = 422, description = "Date outside the period, duplicate date, or field out of bounds")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateEntryInput>,
) -> AppResult<Json<ApiResponse<EntryMutationData>>> {
    let mutation = state.timesheets.create_entry(auth.user_id, period_id, input).await?;

    Ok(mutation_response(mutation, "Entry created"))
}

/// PUT /api/entries/{id}
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    params(
        ("id" = i32, Path, description = "Entry ID")
    ),
    request_body = UpdateEntryInput,
    responses(
        (status = 200, description = "Entry updated and totals recalculated", body = ApiResponse<EntryMutationData>),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Period is no longer a draft"),
        (status = 422, description = "Date outside the period, duplicate date, or field out of bounds")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<i32>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateEntryInput>,
) -> AppResult<Json<ApiResponse<EntryMutationData>>> {
    let mutation = state.timesheets.update_entry(auth.user_id, entry_id, input).await?;

    Ok(mutation_response(mutation, "Entry updated"))
}

/// DELETE /api/entries/{id} - Soft delete an entry
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(
        ("id" = i32, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted and totals recalculated", body = ApiResponse<EntryMutationData>),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Period is no longer a draft")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<EntryMutationData>>> {
    let mutation = state.timesheets.delete_entry(auth.user_id, entry_id).await?;

    Ok(mutation_response(mutation, "Entry deleted"))
}
