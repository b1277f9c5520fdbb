// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::Parser;
use parkledger_api::{
    AddStaffRequest, ApiError, AuditLogResponse, CheckInRequest, CheckInResponse,
    CheckOutRequest, CollectDueRequest, CreateSlotRequest, DeleteSlotResponse, DueResponse,
    FeePreviewResponse, LedgerConfig, ListDuesRequest, ListMySlotsRequest, ListSessionsRequest,
    MarkEscapedRequest, Page, PageRequest, ReconciliationReport, RemoveStaffResponse,
    SessionCloseResponse, SessionLookup, SlotDetailResponse, SlotResponse, SlotRoleSummary,
    StaffListResponse, UpdateSlotRequest, VehicleHistoryRequest, VehicleHistoryResponse,
    VerifySlotRequest, WriteOffDueRequest, add_staff, check_in, check_out, collect_due,
    create_slot, deactivate_slot, delete_slot, get_slot, list_dues, list_my_slots,
    list_pending_slots, list_sessions, list_staff, mark_escaped, my_slot_roles,
    preview_checkout_fee, reactivate_slot, reconcile_occupancy, remove_staff, slot_audit_log,
    slot_availability, update_slot, vehicle_history, verify_slot, write_off_due,
};
use parkledger_domain::{
    ClassAvailability, Due, DueStatus, Session, SessionStatus, SlotStatus, StaffAssignment,
};
use parkledger_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::identity::RequestActor;

/// Parking ledger server - HTTP front for slot capacity, sessions and dues
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, conflicts_with = "mysql_url")]
    database: Option<String>,

    /// `MySQL`/`MariaDB` connection URL. Takes the place of `SQLite` when given.
    #[arg(long)]
    mysql_url: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Open a due for the shortfall when a vehicle checks out underpaid
    #[arg(long)]
    open_due_on_underpayment: bool,
}

/// Application state shared across handlers.
///
/// Every ledger operation runs in one store transaction, so the
/// persistence layer sits behind a single async mutex.
#[derive(Clone)]
struct AppState {
    /// The ledger store.
    persistence: Arc<Mutex<Persistence>>,
    /// Ledger behavior switches and paging limits.
    config: LedgerConfig,
}

/// Paging parameters from the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct PageQuery {
    /// 1-based page number.
    page: Option<u32>,
    /// Items per page.
    page_size: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        Self {
            page: query.page,
            page_size: query.page_size,
        }
    }
}

/// Query string for listing the caller's own slots.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct MySlotsQuery {
    /// Only slots in this status.
    status: Option<SlotStatus>,
    /// 1-based page number.
    page: Option<u32>,
    /// Items per page.
    page_size: Option<u32>,
}

/// Query string for listing a slot's sessions.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct SessionsQuery {
    /// Only sessions in this status.
    status: Option<SessionStatus>,
    /// 1-based page number.
    page: Option<u32>,
    /// Items per page.
    page_size: Option<u32>,
}

/// Query string for listing the caller's dues.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct DuesQuery {
    /// Only dues in this status.
    status: Option<DueStatus>,
    /// 1-based page number.
    page: Option<u32>,
    /// Items per page.
    page_size: Option<u32>,
}

/// Error response body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Stable error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The stable error code.
    code: &'static str,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotAuthorized { .. } | ApiError::InsufficientRole { .. } => {
                StatusCode::FORBIDDEN
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DomainRuleViolation { .. } => StatusCode::CONFLICT,
            ApiError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { message } => {
                error!(error = %message, "Ledger operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Handler for POST `/slots`.
async fn handle_create_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<CreateSlotRequest>,
) -> Result<Json<SlotResponse>, HttpError> {
    info!(actor_id = %actor.id, name = %req.name, "Handling create_slot request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SlotResponse =
        create_slot(&mut persistence, &req, &actor, cause, OffsetDateTime::now_utc())?;
    drop(persistence);

    info!(slot_id = response.slot.slot_id, "Created slot");
    Ok(Json(response))
}

/// Handler for GET `/slots/pending`.
async fn handle_list_pending_slots(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<SlotResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let page: Page<SlotResponse> = list_pending_slots(
        &mut persistence,
        &app_state.config,
        &PageRequest::from(query),
        &actor,
    )?;
    Ok(Json(page))
}

/// Handler for GET `/slots/mine`.
async fn handle_list_my_slots(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Query(query): Query<MySlotsQuery>,
) -> Result<Json<Page<SlotDetailResponse>>, HttpError> {
    let request: ListMySlotsRequest = ListMySlotsRequest {
        status: query.status,
        page: PageRequest {
            page: query.page,
            page_size: query.page_size,
        },
    };

    let mut persistence = app_state.persistence.lock().await;
    let page: Page<SlotDetailResponse> =
        list_my_slots(&mut persistence, &app_state.config, &request, &actor)?;
    Ok(Json(page))
}

/// Handler for GET `/slots/roles`.
async fn handle_my_slot_roles(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
) -> Result<Json<Vec<SlotRoleSummary>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let roles: Vec<SlotRoleSummary> = my_slot_roles(&mut persistence, &actor)?;
    Ok(Json(roles))
}

/// Handler for GET `/slots/{slot_id}`.
async fn handle_get_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<SlotDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: SlotDetailResponse = get_slot(&mut persistence, slot_id, &actor)?;
    Ok(Json(response))
}

/// Handler for PUT `/slots/{slot_id}`.
///
/// Only INACTIVE slots may be edited.
async fn handle_update_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
    Json(req): Json<UpdateSlotRequest>,
) -> Result<Json<SlotResponse>, HttpError> {
    info!(actor_id = %actor.id, slot_id, "Handling update_slot request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SlotResponse = update_slot(
        &mut persistence,
        slot_id,
        &req,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/slots/{slot_id}`.
async fn handle_delete_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<DeleteSlotResponse>, HttpError> {
    info!(actor_id = %actor.id, slot_id, "Handling delete_slot request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteSlotResponse = delete_slot(
        &mut persistence,
        slot_id,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/slots/{slot_id}/verify`.
async fn handle_verify_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
    Json(req): Json<VerifySlotRequest>,
) -> Result<Json<SlotResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        slot_id,
        approve = req.approve,
        "Handling verify_slot request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: SlotResponse = verify_slot(
        &mut persistence,
        slot_id,
        &req,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/slots/{slot_id}/deactivate`.
async fn handle_deactivate_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<SlotResponse>, HttpError> {
    info!(actor_id = %actor.id, slot_id, "Handling deactivate_slot request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SlotResponse = deactivate_slot(
        &mut persistence,
        slot_id,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/slots/{slot_id}/reactivate`.
async fn handle_reactivate_slot(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<SlotResponse>, HttpError> {
    info!(actor_id = %actor.id, slot_id, "Handling reactivate_slot request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SlotResponse = reactivate_slot(
        &mut persistence,
        slot_id,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/slots/{slot_id}/availability`.
async fn handle_slot_availability(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<Vec<ClassAvailability>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let availability: Vec<ClassAvailability> =
        slot_availability(&mut persistence, slot_id, &actor)?;
    Ok(Json(availability))
}

/// Handler for GET `/slots/{slot_id}/reconcile`.
///
/// Reports drift between counters and live sessions. Never repairs.
async fn handle_reconcile_occupancy(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<ReconciliationReport>, HttpError> {
    info!(actor_id = %actor.id, slot_id, "Handling reconcile_occupancy request");

    let mut persistence = app_state.persistence.lock().await;
    let report: ReconciliationReport = reconcile_occupancy(&mut persistence, slot_id, &actor)?;
    Ok(Json(report))
}

/// Handler for GET `/slots/{slot_id}/audit`.
async fn handle_slot_audit_log(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AuditLogResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditLogResponse = slot_audit_log(
        &mut persistence,
        &app_state.config,
        slot_id,
        &PageRequest::from(query),
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/slots/{slot_id}/sessions`.
async fn handle_list_sessions(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Page<Session>>, HttpError> {
    let request: ListSessionsRequest = ListSessionsRequest {
        slot_id,
        status: query.status,
        page: PageRequest {
            page: query.page,
            page_size: query.page_size,
        },
    };

    let mut persistence = app_state.persistence.lock().await;
    let page: Page<Session> =
        list_sessions(&mut persistence, &app_state.config, &request, &actor)?;
    Ok(Json(page))
}

// ============================================================================
// Staff
// ============================================================================

/// Handler for GET `/slots/{slot_id}/staff`.
async fn handle_list_staff(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(slot_id): Path<i64>,
) -> Result<Json<StaffListResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: StaffListResponse = list_staff(&mut persistence, slot_id, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/slots/{slot_id}/staff`.
async fn handle_add_staff(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path(slot_id): Path<i64>,
    Json(req): Json<AddStaffRequest>,
) -> Result<Json<StaffAssignment>, HttpError> {
    info!(
        actor_id = %actor.id,
        slot_id,
        staff = %req.actor_id,
        role = %req.role,
        "Handling add_staff request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let assignment: StaffAssignment = add_staff(
        &mut persistence,
        slot_id,
        &req,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(assignment))
}

/// Handler for DELETE `/slots/{slot_id}/staff/{assignment_id}`.
async fn handle_remove_staff(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Path((slot_id, assignment_id)): Path<(i64, i64)>,
) -> Result<Json<RemoveStaffResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        slot_id,
        assignment_id,
        "Handling remove_staff request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RemoveStaffResponse = remove_staff(
        &mut persistence,
        slot_id,
        assignment_id,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

// ============================================================================
// Sessions
// ============================================================================

/// Handler for POST `/sessions/check_in`.
async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        slot_id = req.slot_id,
        vehicle = %req.vehicle_number,
        class = %req.vehicle_class,
        "Handling check_in request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CheckInResponse =
        check_in(&mut persistence, &req, &actor, cause, OffsetDateTime::now_utc())?;
    drop(persistence);

    info!(session_id = response.session.session_id, "Checked in");
    Ok(Json(response))
}

/// Handler for POST `/sessions/check_out`.
async fn handle_check_out(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<CheckOutRequest>,
) -> Result<Json<SessionCloseResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        session_id = ?req.lookup.session_id,
        collected = %req.collected,
        "Handling check_out request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: SessionCloseResponse = check_out(
        &mut persistence,
        &app_state.config,
        &req,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/sessions/escape`.
async fn handle_mark_escaped(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<MarkEscapedRequest>,
) -> Result<Json<SessionCloseResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        session_id = ?req.lookup.session_id,
        "Handling mark_escaped request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: SessionCloseResponse =
        mark_escaped(&mut persistence, &req, &actor, cause, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for GET `/sessions/preview`.
async fn handle_preview_checkout_fee(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Query(lookup): Query<SessionLookup>,
) -> Result<Json<FeePreviewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: FeePreviewResponse =
        preview_checkout_fee(&mut persistence, &lookup, &actor, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for GET `/vehicles/{vehicle_number}/history`.
async fn handle_vehicle_history(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Path(vehicle_number): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<VehicleHistoryResponse>, HttpError> {
    let request: VehicleHistoryRequest = VehicleHistoryRequest {
        vehicle_number,
        page: PageRequest::from(query),
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: VehicleHistoryResponse =
        vehicle_history(&mut persistence, &app_state.config, &request, &actor)?;
    Ok(Json(response))
}

// ============================================================================
// Dues
// ============================================================================

/// Handler for GET `/dues`.
///
/// Lists dues owed to the calling owner.
async fn handle_list_dues(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _cause): RequestActor,
    Query(query): Query<DuesQuery>,
) -> Result<Json<Page<Due>>, HttpError> {
    let request: ListDuesRequest = ListDuesRequest {
        status: query.status,
        page: PageRequest {
            page: query.page,
            page_size: query.page_size,
        },
    };

    let mut persistence = app_state.persistence.lock().await;
    let page: Page<Due> = list_dues(&mut persistence, &app_state.config, &request, &actor)?;
    Ok(Json(page))
}

/// Handler for POST `/dues/collect`.
async fn handle_collect_due(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<CollectDueRequest>,
) -> Result<Json<DueResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        due_id = req.due_id,
        amount = %req.amount,
        "Handling collect_due request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: DueResponse =
        collect_due(&mut persistence, &req, &actor, cause, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for POST `/dues/write_off`.
async fn handle_write_off_due(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<WriteOffDueRequest>,
) -> Result<Json<DueResponse>, HttpError> {
    info!(actor_id = %actor.id, due_id = req.due_id, "Handling write_off_due request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DueResponse =
        write_off_due(&mut persistence, &req, &actor, cause, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/slots", post(handle_create_slot))
        .route("/slots/pending", get(handle_list_pending_slots))
        .route("/slots/mine", get(handle_list_my_slots))
        .route("/slots/roles", get(handle_my_slot_roles))
        .route(
            "/slots/{slot_id}",
            get(handle_get_slot)
                .put(handle_update_slot)
                .delete(handle_delete_slot),
        )
        .route("/slots/{slot_id}/verify", post(handle_verify_slot))
        .route("/slots/{slot_id}/deactivate", post(handle_deactivate_slot))
        .route("/slots/{slot_id}/reactivate", post(handle_reactivate_slot))
        .route(
            "/slots/{slot_id}/availability",
            get(handle_slot_availability),
        )
        .route("/slots/{slot_id}/reconcile", get(handle_reconcile_occupancy))
        .route("/slots/{slot_id}/audit", get(handle_slot_audit_log))
        .route("/slots/{slot_id}/sessions", get(handle_list_sessions))
        .route(
            "/slots/{slot_id}/staff",
            get(handle_list_staff).post(handle_add_staff),
        )
        .route(
            "/slots/{slot_id}/staff/{assignment_id}",
            delete(handle_remove_staff),
        )
        .route("/sessions/check_in", post(handle_check_in))
        .route("/sessions/check_out", post(handle_check_out))
        .route("/sessions/escape", post(handle_mark_escaped))
        .route("/sessions/preview", get(handle_preview_checkout_fee))
        .route(
            "/vehicles/{vehicle_number}/history",
            get(handle_vehicle_history),
        )
        .route("/dues", get(handle_list_dues))
        .route("/dues/collect", post(handle_collect_due))
        .route("/dues/write_off", post(handle_write_off_due))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing parking ledger server");

    let persistence: Persistence = if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        Persistence::new_with_mysql(url)?
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config: LedgerConfig = LedgerConfig {
        open_due_on_underpayment: args.open_due_on_underpayment,
        ..LedgerConfig::default()
    };
    info!(
        open_due_on_underpayment = config.open_due_on_underpayment,
        "Ledger configuration loaded"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const OWNER: (&str, &str) = ("owner-1", "member");
    const ADMIN: (&str, &str) = ("platform-admin", "admin");

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            config: LedgerConfig::default(),
        }
    }

    /// Sends one request and returns the status with the parsed JSON body.
    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        actor: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> (HttpStatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = actor {
            builder = builder
                .header("X-Actor-Id", id)
                .header("X-Actor-Role", role)
                .header("X-Request-Id", "test-request");
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status: HttpStatusCode = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        (status, value)
    }

    /// Creates and approves a slot, returning its id.
    async fn create_active_slot(app: &Router, body: Value) -> i64 {
        let (status, created) = send(app, "POST", "/slots", Some(OWNER), Some(body)).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(created["slot"]["status"], "PENDING_VERIFICATION");
        let slot_id: i64 = created["slot"]["slot_id"].as_i64().unwrap();

        let (status, verified) = send(
            app,
            "POST",
            &format!("/slots/{slot_id}/verify"),
            Some(ADMIN),
            Some(json!({ "approve": true })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(verified["slot"]["status"], "ACTIVE");
        slot_id
    }

    fn free_single_car_slot() -> Value {
        json!({
            "name": "North Gate",
            "address": "1 Harbour Road",
            "latitude": 12.97,
            "longitude": 77.59,
            "capacity": { "CAR": 1 },
            "pricing_model": "FREE"
        })
    }

    fn fixed_car_slot() -> Value {
        json!({
            "name": "Market Street Lot",
            "address": "5 Market Street",
            "latitude": 12.97,
            "longitude": 77.59,
            "capacity": { "CAR": 2 },
            "pricing_model": "FIXED",
            "pricing_config": { "CAR": 50 }
        })
    }

    fn check_in_body(slot_id: i64, vehicle: &str) -> Value {
        json!({
            "slot_id": slot_id,
            "vehicle_number": vehicle,
            "vehicle_class": "CAR"
        })
    }

    #[tokio::test]
    async fn test_missing_actor_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(&app, "POST", "/slots", None, Some(fixed_car_slot())).await;
        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTHENTICATION_FAILED");
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_unknown_role_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            "GET",
            "/slots/pending",
            Some(("someone", "superuser")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTHENTICATION_FAILED");
    }

    #[tokio::test]
    async fn test_unknown_slot_is_not_found() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(&app, "GET", "/slots/999", Some(OWNER), None).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SLOT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_verification_requires_platform_admin() {
        let app: Router = build_router(create_test_app_state());
        let (_, created) = send(&app, "POST", "/slots", Some(OWNER), Some(fixed_car_slot())).await;
        let slot_id: i64 = created["slot"]["slot_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/slots/{slot_id}/verify"),
            Some(OWNER),
            Some(json!({ "approve": true })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NOT_AUTHORIZED");

        let (status, pending) = send(&app, "GET", "/slots/pending", Some(ADMIN), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(pending["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_space_check_in_and_out() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, free_single_car_slot()).await;

        let (status, checked_in) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "ab 12 cd 3456")),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(checked_in["session"]["status"], "CHECKED_IN");
        assert_eq!(checked_in["availability"]["available"], 0);
        let session_id: i64 = checked_in["session"]["session_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "KA01AB1234")),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert_eq!(body["code"], "CAPACITY_FULL");

        let (status, closed) = send(
            &app,
            "POST",
            "/sessions/check_out",
            Some(OWNER),
            Some(json!({ "session_id": session_id })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(closed["session"]["status"], "CHECKED_OUT");
        assert_eq!(closed["session"]["payment_status"], "PAID");
        assert!(closed["due"].is_null());

        let (status, availability) = send(
            &app,
            "GET",
            &format!("/slots/{slot_id}/availability"),
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(availability[0]["occupied"], 0);
    }

    #[tokio::test]
    async fn test_malformed_vehicle_is_unprocessable() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, free_single_car_slot()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "--")),
        )
        .await;
        assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_escape_blocks_until_due_collected() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, fixed_car_slot()).await;

        let (_, checked_in) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "AB12CD3456")),
        )
        .await;
        let session_id: i64 = checked_in["session"]["session_id"].as_i64().unwrap();

        let (status, escaped) = send(
            &app,
            "POST",
            "/sessions/escape",
            Some(OWNER),
            Some(json!({ "session_id": session_id })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(escaped["session"]["status"], "ESCAPED");
        assert_eq!(escaped["due"]["status"], "PENDING");
        let due_id: i64 = escaped["due"]["due_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "AB12CD3456")),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert_eq!(body["code"], "OUTSTANDING_DUES_BLOCK");

        let (status, pending) =
            send(&app, "GET", "/dues?status=PENDING", Some(OWNER), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(pending["items"].as_array().unwrap().len(), 1);

        let (status, settled) = send(
            &app,
            "POST",
            "/dues/collect",
            Some(OWNER),
            Some(json!({ "due_id": due_id, "amount": 50, "payment_method": "CASH" })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(settled["due"]["status"], "PAID");

        let (status, _) = send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "AB12CD3456")),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
    }

    #[tokio::test]
    async fn test_staff_routes() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, fixed_car_slot()).await;

        let (status, assignment) = send(
            &app,
            "POST",
            &format!("/slots/{slot_id}/staff"),
            Some(OWNER),
            Some(json!({ "actor_id": "staff-1", "role": "STAFF" })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let assignment_id: i64 = assignment["assignment_id"].as_i64().unwrap();

        let (status, listed) = send(
            &app,
            "GET",
            &format!("/slots/{slot_id}/staff"),
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(listed["staff"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/slots/{slot_id}/deactivate"),
            Some(("staff-1", "member")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
        assert_eq!(body["code"], "INSUFFICIENT_ROLE");

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/slots/{slot_id}/staff/{assignment_id}"),
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/slots/{slot_id}/sessions"),
            Some(("staff-1", "member")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NOT_AUTHORIZED");
    }

    #[tokio::test]
    async fn test_vehicle_history_route_normalizes_identifier() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, free_single_car_slot()).await;
        send(
            &app,
            "POST",
            "/sessions/check_in",
            Some(OWNER),
            Some(check_in_body(slot_id, "AB12CD3456")),
        )
        .await;

        let (status, history) = send(
            &app,
            "GET",
            "/vehicles/ab12cd3456/history?page=1&page_size=5",
            Some(("anyone", "member")),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(history["total_sessions"], 1);
        assert_eq!(history["active_sessions"], 1);
        assert_eq!(history["sessions"]["page_size"], 5);
    }

    #[tokio::test]
    async fn test_own_slots_and_role_summary_routes() {
        let app: Router = build_router(create_test_app_state());
        let slot_id: i64 = create_active_slot(&app, fixed_car_slot()).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/slots/{slot_id}/staff"),
            Some(OWNER),
            Some(json!({ "actor_id": "staff-1", "role": "STAFF" })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, mine) = send(&app, "GET", "/slots/mine", Some(OWNER), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(mine["items"].as_array().unwrap().len(), 1);
        assert_eq!(mine["items"][0]["slot"]["slot_id"], slot_id);

        let (status, pending) = send(
            &app,
            "GET",
            "/slots/mine?status=PENDING_VERIFICATION",
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert!(pending["items"].as_array().unwrap().is_empty());

        let (status, roles) =
            send(&app, "GET", "/slots/roles", Some(("staff-1", "member")), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        let roles = roles.as_array().unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0]["slot_id"], slot_id);
        assert_eq!(roles[0]["status"], "ACTIVE");
    }
}
