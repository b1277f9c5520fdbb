// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger_audit::AuditEvent;
use parkledger_domain::{
    ActorId, CapacityMap, DueDraft, GeoPoint, Money, PaymentMethod, PaymentTiming, PricingModel,
    PricingPolicy, SessionClosure, SlotStatus, StaffRole, Verification,
};
use serde::Serialize;
use serde_json::Value;

/// The result of a successful transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult<T> {
    /// The records to write.
    pub outcome: T,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// What to do when check-out collects less than the fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderpaymentPolicy {
    /// Record PARTIAL or PENDING on the session only.
    #[default]
    RecordOnly,
    /// Also open a due for the shortfall against the slot owner.
    OpenDue,
}

/// Payment details captured at check-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutInput {
    /// Amount taken at the gate.
    pub collected: Money,
    /// How it was taken.
    pub payment_method: Option<PaymentMethod>,
    /// Free-form operator notes.
    pub notes: Option<String>,
}

/// Everything written when a session closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClose {
    /// The closing fields for the session row.
    pub closure: SessionClosure,
    /// A due to open alongside, if the close leaves money owed.
    pub due: Option<DueDraft>,
}

/// A due payment taken by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueCollection {
    /// Amount received now.
    pub amount: Money,
    /// How it was received.
    pub payment_method: Option<PaymentMethod>,
    /// The session during which it was collected, if any.
    pub payment_session_id: Option<i64>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Raw slot creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlotInput {
    pub organization_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: CapacityMap,
    pub pricing_model: PricingModel,
    pub pricing_config: Option<Value>,
    pub payment_timing: PaymentTiming,
}

/// Partial slot edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotConfigUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: Option<CapacityMap>,
    pub pricing_model: Option<PricingModel>,
    pub pricing_config: Option<Value>,
    pub payment_timing: Option<PaymentTiming>,
}

/// The full editable configuration of a slot after an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotConfig {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub geo: GeoPoint,
    pub capacity: CapacityMap,
    pub pricing: PricingPolicy,
    pub payment_timing: PaymentTiming,
}

/// Administrator decision on a pending slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationDecision {
    /// Open the slot for business.
    Approve,
    /// Refuse it. A reason is mandatory.
    Reject {
        /// Why the slot was refused.
        reason: Option<String>,
    },
}

/// A slot status change with its verification stamp, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatusChange {
    pub slot_id: i64,
    pub status: SlotStatus,
    pub verification: Option<Verification>,
}

/// A staff assignment about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffDraft {
    pub slot_id: i64,
    pub actor: ActorId,
    pub role: StaffRole,
}
