// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::access::{OrgRole, StaffRole};
use crate::capacity::{CapacityMap, ClassAvailability};
use crate::error::DomainError;
use crate::lifecycle::{DueStatus, OrganizationStatus, PaymentStatus, SessionStatus, SlotStatus};
use crate::money::Money;
use crate::pricing::PricingPolicy;
use crate::types::{ActorId, PaymentMethod, PaymentTiming, VehicleClass, VehicleNumber};

/// Geographic position of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidInput {
                field: "latitude",
                message: format!("{latitude} is outside -90..=90"),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidInput {
                field: "longitude",
                message: format!("{longitude} is outside -180..=180"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Outcome of administrator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// The reviewing administrator.
    pub verified_by: ActorId,
    /// When the decision was made.
    #[serde(with = "time::serde::rfc3339")]
    pub verified_at: OffsetDateTime,
    /// Present only for rejections.
    pub rejection_reason: Option<String>,
}

/// A slot about to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotDraft {
    pub owner: ActorId,
    pub organization_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub geo: GeoPoint,
    pub capacity: CapacityMap,
    pub pricing: PricingPolicy,
    pub payment_timing: PaymentTiming,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A persisted parking slot with its live occupancy counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub slot_id: i64,
    pub owner: ActorId,
    pub organization_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub geo: GeoPoint,
    pub capacity: CapacityMap,
    /// Current counters per class, read from the capacity ledger.
    pub occupancy: BTreeMap<VehicleClass, u32>,
    pub pricing: PricingPolicy,
    pub payment_timing: PaymentTiming,
    pub status: SlotStatus,
    pub verification: Option<Verification>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Slot {
    /// Counter for a class, zero if the class is not held.
    #[must_use]
    pub fn occupied(&self, class: VehicleClass) -> u32 {
        self.occupancy.get(&class).copied().unwrap_or(0)
    }

    /// Whether the slot's access is resolved through an organization.
    #[must_use]
    pub const fn is_organization_slot(&self) -> bool {
        self.organization_id.is_some()
    }

    /// Availability for one class.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::LedgerInvariant`] if the stored counter exceeds capacity.
    pub fn availability_for(&self, class: VehicleClass) -> Result<ClassAvailability, DomainError> {
        ClassAvailability::from_counters(class, self.capacity.get(class), self.occupied(class))
    }

    /// Availability for every capacity-bearing class.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::LedgerInvariant`] if any stored counter exceeds capacity.
    pub fn availability(&self) -> Result<Vec<ClassAvailability>, DomainError> {
        self.capacity
            .classes()
            .map(|class| self.availability_for(class))
            .collect()
    }
}

/// A staff-list entry binding an actor to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffAssignment {
    pub assignment_id: i64,
    pub slot_id: i64,
    pub actor: ActorId,
    pub role: StaffRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An organization as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub organization_id: i64,
    pub name: String,
    pub status: OrganizationStatus,
}

/// An actor's membership in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgMembership {
    pub organization_id: i64,
    pub actor: ActorId,
    pub role: OrgRole,
}

/// A session about to be opened at check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDraft {
    pub slot_id: i64,
    pub vehicle: VehicleNumber,
    pub vehicle_class: VehicleClass,
    pub vehicle_owner: Option<ActorId>,
    pub checked_in_by: ActorId,
    #[serde(with = "time::serde::rfc3339")]
    pub check_in_at: OffsetDateTime,
}

/// One vehicle's stay at a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: i64,
    pub slot_id: i64,
    pub vehicle: VehicleNumber,
    pub vehicle_class: VehicleClass,
    pub vehicle_owner: Option<ActorId>,
    pub checked_in_by: ActorId,
    pub checked_out_by: Option<ActorId>,
    #[serde(with = "time::serde::rfc3339")]
    pub check_in_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_out_at: Option<OffsetDateTime>,
    pub status: SessionStatus,
    pub calculated_fee: Money,
    pub collected: Money,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// The fields written when a session closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClosure {
    pub status: SessionStatus,
    pub closed_by: ActorId,
    #[serde(with = "time::serde::rfc3339")]
    pub closed_at: OffsetDateTime,
    pub calculated_fee: Money,
    pub collected: Money,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// A due about to be opened.
///
/// A due for a zero amount is born settled so it never blocks check-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueDraft {
    pub vehicle: VehicleNumber,
    pub owner: ActorId,
    pub session_id: i64,
    pub amount_due: Money,
    pub status: DueStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

/// An unpaid balance owed to a slot owner by a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Due {
    pub due_id: i64,
    pub vehicle: VehicleNumber,
    pub owner: ActorId,
    pub session_id: i64,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub status: DueStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub collected_by: Option<ActorId>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_session_id: Option<i64>,
    pub notes: Option<String>,
}

impl Due {
    /// What is still owed, never negative.
    #[must_use]
    pub fn outstanding(&self) -> Money {
        self.amount_due.saturating_sub(self.amount_paid)
    }
}

/// The fields written when a due changes state or receives a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuePayment {
    pub amount_paid: Money,
    pub status: DueStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub collected_by: Option<ActorId>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_session_id: Option<i64>,
    pub notes: Option<String>,
}
