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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! Operation boundary for the parking ledger.
//!
//! Callers hand every operation a verified [`AuthenticatedActor`], a
//! [`Cause`](parkledger_audit::Cause) and the current time. The operation
//! resolves the actor's role on the slot involved, runs the matching core
//! transition, and writes the result in a single store transaction. Errors
//! come back as [`ApiError`], each carrying a stable code.

mod auth;
mod config;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthorizationService, OrganizationStrategy, Role, RoleStrategy,
    StaffListStrategy, resolve_role, strategy_for,
};
pub use config::{LedgerConfig, PageWindow};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    add_staff, check_in, check_out, collect_due, create_slot, deactivate_slot, delete_slot,
    get_slot, list_dues, list_my_slots, list_pending_slots, list_sessions, list_staff,
    mark_escaped, my_slot_roles, preview_checkout_fee, reactivate_slot, reconcile_occupancy,
    remove_staff, slot_audit_log, slot_availability, update_slot, vehicle_history, verify_slot,
    write_off_due,
};
pub use request_response::{
    AddStaffRequest, AuditLogResponse, CheckInRequest, CheckInResponse, CheckOutRequest,
    CollectDueRequest, CreateSlotRequest, DeleteSlotResponse, DueResponse, FeePreviewResponse,
    ListDuesRequest, ListMySlotsRequest, ListSessionsRequest, MarkEscapedRequest, Page,
    PageRequest, ReconciliationReport, RemoveStaffResponse, SessionCloseResponse, SessionLookup,
    SlotDetailResponse, SlotResponse, SlotRoleSummary, StaffListResponse, UpdateSlotRequest,
    VehicleHistoryRequest, VehicleHistoryResponse, VerifySlotRequest, WriteOffDueRequest,
};
