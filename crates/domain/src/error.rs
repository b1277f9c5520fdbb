// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

use crate::lifecycle::{DueStatus, SessionStatus, SlotStatus};
use crate::money::Money;
use crate::pricing::PricingModel;
use crate::types::VehicleClass;

/// Errors raised by ledger rules.
///
/// Every variant except [`DomainError::LedgerInvariant`] and
/// [`DomainError::UnknownValue`] is a user-facing rule violation with a
/// stable code (see [`DomainError::code`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The slot is not in the ACTIVE state.
    #[error("Slot {slot_id} is not active (status: {status})")]
    SlotNotActive {
        /// The slot identifier.
        slot_id: i64,
        /// The slot's current status.
        status: SlotStatus,
    },
    /// A configuration edit was attempted while the slot is ACTIVE.
    #[error("Slot {slot_id} is active; deactivate it before changing its configuration")]
    SlotActive {
        /// The slot identifier.
        slot_id: i64,
    },
    /// Verification was attempted on a slot that is no longer pending.
    #[error("Slot {slot_id} is not pending verification (status: {status})")]
    SlotNotPending {
        /// The slot identifier.
        slot_id: i64,
        /// The slot's current status.
        status: SlotStatus,
    },
    /// The slot still holds checked-in vehicles.
    #[error("Slot {slot_id} has {count} vehicle(s) checked in")]
    ActiveSessionsExist {
        /// The slot identifier.
        slot_id: i64,
        /// Number of `CHECKED_IN` sessions.
        count: i64,
    },
    /// The vehicle already has a `CHECKED_IN` session somewhere.
    #[error("Vehicle {vehicle} is already checked in at {slot_name}")]
    AlreadyCheckedIn {
        /// Normalized vehicle identifier.
        vehicle: String,
        /// Name of the slot holding the open session.
        slot_name: String,
    },
    /// No matching session exists.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// The session has already been closed.
    #[error("Session {session_id} is not checked in (status: {status})")]
    NotCheckedIn {
        /// The session identifier.
        session_id: i64,
        /// The session's current status.
        status: SessionStatus,
    },
    /// No space left for the vehicle class.
    #[error("No {vehicle_class} capacity available (capacity {capacity})")]
    CapacityFull {
        /// The requested vehicle class.
        vehicle_class: VehicleClass,
        /// Configured capacity for the class.
        capacity: u32,
    },
    /// The vehicle owes an unpaid due to the slot owner.
    #[error("Vehicle {vehicle} has an outstanding due of {outstanding} to this owner")]
    OutstandingDuesBlock {
        /// Normalized vehicle identifier.
        vehicle: String,
        /// The outstanding due identifier.
        due_id: i64,
        /// Amount still owed.
        outstanding: Money,
    },
    /// No matching due exists.
    #[error("Due {0} not found")]
    DueNotFound(i64),
    /// The due is already closed.
    #[error("Due {due_id} is not pending (status: {status})")]
    DueNotPending {
        /// The due identifier.
        due_id: i64,
        /// The due's current status.
        status: DueStatus,
    },
    /// A paid pricing model was supplied without configuration.
    #[error("Pricing configuration is required for {model} pricing")]
    MissingPricingConfig {
        /// The pricing model that needs configuration.
        model: PricingModel,
    },
    /// The pricing configuration omits capacity-bearing vehicle classes.
    #[error("Pricing configuration is missing entries for: {}", join_classes(.missing))]
    IncompletePricingConfig {
        /// Vehicle classes with capacity but no pricing entry.
        missing: Vec<VehicleClass>,
    },
    /// The pricing configuration is malformed or out of range.
    #[error("Invalid pricing configuration: {0}")]
    InvalidPricingConfig(String),
    /// The vehicle identifier does not normalize to an acceptable value.
    #[error("Invalid vehicle number: '{0}'")]
    InvalidVehicleNumber(String),
    /// A request field failed validation.
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
    /// OWNER cannot be granted through staff management.
    #[error("The owner role cannot be assigned as staff")]
    OwnerAsStaff,
    /// The actor already holds an assignment on the slot.
    #[error("Actor '{actor}' is already assigned to this slot")]
    AlreadyStaff {
        /// The actor identifier.
        actor: String,
    },
    /// The OWNER assignment is permanent.
    #[error("The slot owner assignment cannot be removed")]
    CannotRemoveOwner,
    /// No such staff assignment on the slot.
    #[error("Staff assignment {0} not found")]
    StaffNotFound(i64),
    /// Legacy staff lists do not apply to organization slots.
    #[error("Slot {slot_id} is managed through organization membership")]
    OrgManagedSlot {
        /// The slot identifier.
        slot_id: i64,
    },
    /// A stored or supplied enumeration value is not recognized.
    #[error("Unknown {kind} value: '{value}'")]
    UnknownValue {
        /// The enumeration name.
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },
    /// A ledger invariant was found broken. This is a programming error.
    #[error("Ledger invariant violated: {0}")]
    LedgerInvariant(String),
}

impl DomainError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SlotNotActive { .. } => "SLOT_NOT_ACTIVE",
            Self::SlotActive { .. } => "SLOT_ACTIVE",
            Self::SlotNotPending { .. } => "SLOT_NOT_PENDING",
            Self::ActiveSessionsExist { .. } => "ACTIVE_SESSIONS_EXIST",
            Self::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::NotCheckedIn { .. } => "NOT_CHECKED_IN",
            Self::CapacityFull { .. } => "CAPACITY_FULL",
            Self::OutstandingDuesBlock { .. } => "OUTSTANDING_DUES_BLOCK",
            Self::DueNotFound(_) => "DUE_NOT_FOUND",
            Self::DueNotPending { .. } => "DUE_NOT_PENDING",
            Self::MissingPricingConfig { .. } => "MISSING_PRICING_CONFIG",
            Self::IncompletePricingConfig { .. } => "INCOMPLETE_PRICING_CONFIG",
            Self::InvalidPricingConfig(_) => "INVALID_PRICING_CONFIG",
            Self::InvalidVehicleNumber(_) | Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::OwnerAsStaff => "OWNER_AS_STAFF",
            Self::AlreadyStaff { .. } => "ALREADY_STAFF",
            Self::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            Self::StaffNotFound(_) => "STAFF_NOT_FOUND",
            Self::OrgManagedSlot { .. } => "ORG_MANAGED_SLOT",
            Self::UnknownValue { .. } | Self::LedgerInvariant(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error signals a programming or data-integrity fault
    /// rather than a rule violation a caller can act on.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::UnknownValue { .. } | Self::LedgerInvariant(_))
    }
}

fn join_classes(classes: &[VehicleClass]) -> String {
    classes
        .iter()
        .map(VehicleClass::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
