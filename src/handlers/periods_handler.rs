use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::{AuthenticatedUser, OptionalJson},
    models::{
        ApiResponse, ApprovePeriodInput, CreatePeriodInput, DenyPeriodInput, PeriodFilter, PeriodWithEntries,
        TimesheetPeriod, UpdatePeriodInput,
    },
    AppResult, AppState,
};

/// GET /api/periods?status=&from=&to=
#[utoipa::path(
    get,
    path = "/api/periods",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Caller's own periods, newest first", body = ApiResponse<Vec<TimesheetPeriod>>),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "periods",
    security(("bearer_auth" = []))
)]
pub async fn list_periods(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(filter): Query<PeriodFilter>,
) -> AppResult<Json<ApiResponse<Vec<TimesheetPeriod>>>> {
    let periods = state.timesheets.list_periods(auth.user_id, &filter).await?;

    tracing::debug!(user_id = auth.user_id, count = periods.len(), "Fetched periods");
    Ok(Json(ApiResponse::ok(periods, "Periods retrieved")))
}

/// GET /api/periods/team?status=&from=&to=
///
/// Approval queue: periods of the caller's reports, `Pending` unless another
/// status is requested.
#[utoipa::path(
    get,
    path = "/api/periods/team",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Periods of the caller's direct reports", body = ApiResponse<Vec<TimesheetPeriod>>),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "approvals",
    security(("bearer_auth" = []))
)]
pub async fn list_team_periods(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(mut filter): Query<PeriodFilter>,
) -> AppResult<Json<ApiResponse<Vec<TimesheetPeriod>>>> {
    if filter.status.is_none() {
        filter.status = PeriodFilter::pending().status;
    }

    let periods = state.timesheets.list_team_periods(auth.user_id, &filter).await?;

    tracing::debug!(manager_id = auth.user_id, count = periods.len(), "Fetched team periods");
    Ok(Json(ApiResponse::ok(periods, "Team periods retrieved")))
}

/// POST /api/periods - Create a draft week
#[utoipa::path(
    post,
    path = "/api/periods",
    request_body = CreatePeriodInput,
    responses(
        (status = 200, description = "Period created in Draft", body = ApiResponse<TimesheetPeriod>),
        (status = 422, description = "Range reversed, not 7 days, or overlapping an existing period")
    ),
    tag = "periods",
    security(("bearer_auth" = []))
)]
pub async fn create_period(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreatePeriodInput>,
) -> AppResult<Json<ApiResponse<TimesheetPeriod>>> {
    let period = state.timesheets.create_period(auth.user_id, input).await?;

    Ok(Json(ApiResponse::ok(period, "Period created")))
}

/// GET /api/periods/{id}
#[utoipa::path(
    get,
    path = "/api/periods/{id}",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Period with its daily entries", body = ApiResponse<PeriodWithEntries>),
        (status = 404, description = "Period not found")
    ),
    tag = "periods",
    security(("bearer_auth" = []))
)]
pub async fn get_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<PeriodWithEntries>>> {
    let period = state.timesheets.get_period(auth.user_id, period_id).await?;

    Ok(Json(ApiResponse::ok(period, "Period retrieved")))
}

/// PUT /api/periods/{id} - Move a draft to another week
#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    request_body = UpdatePeriodInput,
    responses(
        (status = 200, description = "Period updated", body = ApiResponse<TimesheetPeriod>),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Period is no longer a draft"),
        (status = 422, description = "Invalid range, overlap, or entries outside the new range")
    ),
    tag = "periods",
    security(("bearer_auth" = []))
)]
pub async fn update_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdatePeriodInput>,
) -> AppResult<Json<ApiResponse<TimesheetPeriod>>> {
    let period = state.timesheets.update_period(auth.user_id, period_id, input).await?;

    Ok(Json(ApiResponse::ok(period, "Period updated")))
}

/// DELETE /api/periods/{id} - Soft delete a period and its entries
#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Period and entries deleted; data is the period ID", body = ApiResponse<i32>),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Period is pending or approved")
    ),
    tag = "periods",
    security(("bearer_auth" = []))
)]
pub async fn delete_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<i32>>> {
    state.timesheets.delete_period(auth.user_id, period_id).await?;

    Ok(Json(ApiResponse::ok(period_id, "Period deleted")))
}

/// POST /api/periods/{id}/submit - Owner submits a draft for approval
#[utoipa::path(
    post,
    path = "/api/periods/{id}/submit",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Period is now Pending", body = ApiResponse<TimesheetPeriod>),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Period is not a draft")
    ),
    tag = "approvals",
    security(("bearer_auth" = []))
)]
pub async fn submit_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<TimesheetPeriod>>> {
    let period = state.timesheets.submit(auth.user_id, period_id).await?;

    Ok(Json(ApiResponse::ok(period, "Period submitted for approval")))
}

/// POST /api/periods/{id}/approve - Manager approves a pending period
#[utoipa::path(
    post,
    path = "/api/periods/{id}/approve",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    request_body(content = ApprovePeriodInput, description = "Optional; the body may be omitted"),
    responses(
        (status = 200, description = "Period approved", body = ApiResponse<TimesheetPeriod>),
        (status = 404, description = "Period not found or not managed by the caller"),
        (status = 409, description = "Period is not pending")
    ),
    tag = "approvals",
    security(("bearer_auth" = []))
)]
pub async fn approve_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
    OptionalJson(input): OptionalJson<ApprovePeriodInput>,
) -> AppResult<Json<ApiResponse<TimesheetPeriod>>> {
    let period = state
        .timesheets
        .approve(auth.user_id, period_id, input.comment)
        .await?;

    Ok(Json(ApiResponse::ok(period, "Period approved")))
}

/// POST /api/periods/{id}/deny - Manager denies a pending period
#[utoipa::path(
    post,
    path = "/api/periods/{id}/deny",
    params(
        ("id" = i32, Path, description = "Period ID")
    ),
    request_body(content = DenyPeriodInput, description = "Omitting the body is rejected like a blank reason"),
    responses(
        (status = 200, description = "Period denied", body = ApiResponse<TimesheetPeriod>),
        (status = 404, description = "Period not found or not managed by the caller"),
        (status = 409, description = "Period is not pending"),
        (status = 422, description = "Reason missing or longer than 500 characters")
    ),
    tag = "approvals",
    security(("bearer_auth" = []))
)]
pub async fn deny_period(
    State(state): State<Arc<AppState>>,
    Path(period_id): Path<i32>,
    auth: AuthenticatedUser,
    OptionalJson(input): OptionalJson<DenyPeriodInput>,
) -> AppResult<Json<ApiResponse<TimesheetPeriod>>> {
    let period = state
        .timesheets
        .deny(auth.user_id, period_id, input.reason)
        .await?;

    Ok(Json(ApiResponse::ok(period, "Period denied")))
}
