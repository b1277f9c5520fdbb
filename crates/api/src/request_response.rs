// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use std::collections::BTreeMap;

use parkledger_domain::{
    ClassAvailability, Due, DueStatus, EffectiveRole, Money, PaymentMethod, PaymentTiming,
    PricingModel, Session, SessionStatus, Slot, SlotStatus, StaffAssignment, StaffRole,
    VehicleClass, VehicleNumber,
};
use parkledger_persistence::{AuditRecord, ClassDrift};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Optional paging for listings. Pages are one-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, 1 when absent.
    pub page: Option<u32>,
    /// Rows per page, the configured default when absent.
    pub page_size: Option<u32>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The rows on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested rows per page after capping.
    pub page_size: u32,
}

// ============================================================================
// Slots
// ============================================================================

/// API request to register a new slot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateSlotRequest {
    /// Organization the slot is created for, if any.
    pub organization_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Street address.
    pub address: String,
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Spaces per vehicle class. Zero entries are dropped.
    pub capacity: BTreeMap<VehicleClass, u32>,
    /// Pricing model.
    pub pricing_model: PricingModel,
    /// Raw pricing configuration keyed by vehicle class.
    pub pricing_config: Option<Value>,
    /// When payment is expected, on exit when absent.
    pub payment_timing: Option<PaymentTiming>,
}

/// API request carrying an administrator's verification decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifySlotRequest {
    /// Approve when true, reject when false.
    pub approve: bool,
    /// Mandatory for rejections.
    pub rejection_reason: Option<String>,
}

/// API request to edit a slot that is not active. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateSlotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: Option<BTreeMap<VehicleClass, u32>>,
    pub pricing_model: Option<PricingModel>,
    pub pricing_config: Option<Value>,
    pub payment_timing: Option<PaymentTiming>,
}

/// A slot with its live availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotResponse {
    /// The slot.
    pub slot: Slot,
    /// Availability per capacity-bearing class.
    pub availability: Vec<ClassAvailability>,
}

/// A slot as seen by one of its operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotDetailResponse {
    /// The slot.
    pub slot: Slot,
    /// Availability per capacity-bearing class.
    pub availability: Vec<ClassAvailability>,
    /// The caller's role on the slot.
    pub your_role: EffectiveRole,
    /// Vehicles currently checked in.
    pub checked_in_sessions: i64,
}

/// API request to list the caller's own slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListMySlotsRequest {
    /// Only slots in this status.
    pub status: Option<SlotStatus>,
    /// Paging.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// One slot the caller holds a role on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRoleSummary {
    /// The slot.
    pub slot_id: i64,
    /// The slot's name.
    pub name: String,
    /// The slot's lifecycle state.
    pub status: SlotStatus,
    /// The organization owning the slot, if any.
    pub organization_id: Option<i64>,
    /// The caller's role on the slot.
    pub your_role: EffectiveRole,
}

/// API response for a soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteSlotResponse {
    /// The deleted slot.
    pub slot_id: i64,
    /// A success message.
    pub message: String,
}

/// Counter drift found by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// The audited slot.
    pub slot_id: i64,
    /// Per-class comparison of counters with live sessions.
    pub classes: Vec<ClassDrift>,
    /// Whether any class disagrees.
    pub has_drift: bool,
}

/// Audit events recorded against a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogResponse {
    /// The slot.
    pub slot_id: i64,
    /// Events, oldest first.
    pub events: Page<AuditRecord>,
}

// ============================================================================
// Staff
// ============================================================================

/// API request to add an operator to a slot's staff list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddStaffRequest {
    /// The operator's identity.
    pub actor_id: String,
    /// STAFF or VOLUNTEER.
    pub role: StaffRole,
}

/// API response for a staff removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveStaffResponse {
    /// The removed assignment.
    pub assignment_id: i64,
    /// A success message.
    pub message: String,
}

/// A slot's staff list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffListResponse {
    /// The slot.
    pub slot_id: i64,
    /// Assignments, owner first.
    pub staff: Vec<StaffAssignment>,
}

// ============================================================================
// Sessions
// ============================================================================

/// Identifies an open session either directly or by slot and vehicle.
///
/// Staff at the gate rarely keep session ids, so both forms are accepted
/// wherever a session is closed or priced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLookup {
    /// The session id.
    pub session_id: Option<i64>,
    /// The slot the vehicle is parked at.
    pub slot_id: Option<i64>,
    /// The vehicle identifier, in any spacing or case.
    pub vehicle_number: Option<String>,
}

/// API request to check a vehicle in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckInRequest {
    /// The slot.
    pub slot_id: i64,
    /// The vehicle identifier, in any spacing or case.
    pub vehicle_number: String,
    /// The vehicle class.
    pub vehicle_class: VehicleClass,
}

/// API response for a successful check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInResponse {
    /// The opened session.
    pub session: Session,
    /// Availability of the class after the check-in.
    pub availability: ClassAvailability,
}

/// API request to check a vehicle out through the payment path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckOutRequest {
    /// Which session to close.
    #[serde(flatten)]
    pub lookup: SessionLookup,
    /// Amount collected at the gate.
    #[serde(default)]
    pub collected: Money,
    /// How it was collected.
    pub payment_method: Option<PaymentMethod>,
    /// Operator notes.
    pub notes: Option<String>,
}

/// API request to record a vehicle leaving without paying.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkEscapedRequest {
    /// Which session to close.
    #[serde(flatten)]
    pub lookup: SessionLookup,
    /// Operator notes.
    pub notes: Option<String>,
}

/// API response for a closed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionCloseResponse {
    /// The closed session.
    pub session: Session,
    /// The due opened alongside, if any.
    pub due: Option<Due>,
    /// Availability of the class after the release.
    pub availability: ClassAvailability,
}

/// What check-out would charge right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeePreviewResponse {
    pub session_id: i64,
    pub vehicle: VehicleNumber,
    pub vehicle_class: VehicleClass,
    pub pricing_model: PricingModel,
    #[serde(with = "time::serde::rfc3339")]
    pub check_in_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub as_of: OffsetDateTime,
    /// Elapsed hours at two decimals.
    pub duration_hours: Decimal,
    pub fee: Money,
}

/// API request to list a slot's sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListSessionsRequest {
    /// The slot.
    pub slot_id: i64,
    /// Only sessions in this status.
    pub status: Option<SessionStatus>,
    /// Paging.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// API request for a vehicle's history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleHistoryRequest {
    /// The vehicle identifier, in any spacing or case.
    pub vehicle_number: String,
    /// Paging.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// A vehicle's sessions with lifetime totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleHistoryResponse {
    pub vehicle: VehicleNumber,
    /// Whether the vehicle appears in the registry.
    pub registered: bool,
    pub total_sessions: i64,
    pub active_sessions: i64,
    /// Collected across `CHECKED_OUT` sessions.
    pub total_spent: Money,
    /// Still owed across PENDING dues.
    pub outstanding_dues: Money,
    /// Sessions, newest first.
    pub sessions: Page<Session>,
}

// ============================================================================
// Dues
// ============================================================================

/// API request to take a payment against a due.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectDueRequest {
    /// The due.
    pub due_id: i64,
    /// Amount received. Must be positive.
    pub amount: Money,
    /// How it was received.
    pub payment_method: Option<PaymentMethod>,
    /// The session during which it was collected, if any.
    pub payment_session_id: Option<i64>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// API request to forgive a due.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteOffDueRequest {
    /// The due.
    pub due_id: i64,
    /// Why it is being forgiven.
    pub reason: Option<String>,
}

/// API request to list the caller's dues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListDuesRequest {
    /// Only dues in this status.
    pub status: Option<DueStatus>,
    /// Paging.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// A single due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueResponse {
    /// The due after the change.
    pub due: Due,
    /// Still owed.
    pub outstanding: Money,
}
