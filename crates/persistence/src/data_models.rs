// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion to ledger domain values.
//!
//! Money is stored as integer cents and timestamps as RFC 3339 UTC text.
//! Rows that fail to convert surface as
//! [`PersistenceError::ReconstructionError`], never as defaults.

use std::collections::BTreeMap;
use std::str::FromStr;

use diesel::prelude::*;
use parkledger_domain::{
    ActorId, CapacityMap, Due, DueStatus, GeoPoint, Money, OrgMembership, OrgRole, Organization,
    OrganizationStatus, PaymentMethod, PaymentStatus, PaymentTiming, PricingPolicy, Session,
    SessionStatus, Slot, SlotStatus, StaffAssignment, StaffRole, VehicleClass, VehicleNumber,
    Verification,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::diesel_schema::{
    audit_events, dues, organization_members, organizations, sessions, slot_capacity, slots,
    staff_assignments,
};
use crate::error::PersistenceError;

/// Formats a timestamp for storage, normalized to UTC.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be rendered as RFC 3339.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Formats an optional timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be rendered as RFC 3339.
pub fn format_optional_timestamp(
    timestamp: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    timestamp.map(format_timestamp).transpose()
}

fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| PersistenceError::ReconstructionError(format!("bad timestamp {raw}: {e}")))
}

fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<OffsetDateTime>, PersistenceError> {
    raw.map(parse_timestamp).transpose()
}

fn parse_enum<T>(raw: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = parkledger_domain::DomainError>,
{
    Ok(raw.parse::<T>()?)
}

fn parse_optional_enum<T>(raw: Option<&str>) -> Result<Option<T>, PersistenceError>
where
    T: FromStr<Err = parkledger_domain::DomainError>,
{
    raw.map(parse_enum).transpose()
}

fn parse_actor(raw: &str) -> Result<ActorId, PersistenceError> {
    Ok(ActorId::new(raw)?)
}

fn parse_optional_actor(raw: Option<&str>) -> Result<Option<ActorId>, PersistenceError> {
    raw.map(parse_actor).transpose()
}

fn parse_counter(raw: i32, column: &str) -> Result<u32, PersistenceError> {
    u32::try_from(raw).map_err(|_| {
        PersistenceError::InvariantViolation(format!("{column} is negative: {raw}"))
    })
}

/// Converts a counter for storage.
///
/// # Errors
///
/// Returns an error if the value does not fit the column.
pub fn counter_to_column(value: u32) -> Result<i32, PersistenceError> {
    i32::try_from(value).map_err(|_| {
        PersistenceError::SerializationError(format!("counter {value} exceeds column range"))
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = slots)]
pub struct SlotRow {
    pub slot_id: i64,
    pub owner_id: String,
    pub organization_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pricing_model: String,
    pub pricing_json: String,
    pub payment_timing: String,
    pub status: String,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub rejection_reason: Option<String>,
    pub is_deleted: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = slot_capacity)]
pub struct CapacityRow {
    pub slot_id: i64,
    pub vehicle_class: String,
    pub capacity: i32,
    pub occupied: i32,
}

impl SlotRow {
    /// Rebuilds a slot from its row and its capacity ledger rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any stored value is malformed.
    pub fn into_slot(self, capacity_rows: &[CapacityRow]) -> Result<Slot, PersistenceError> {
        let mut capacity_entries: Vec<(VehicleClass, u32)> = Vec::new();
        let mut occupancy: BTreeMap<VehicleClass, u32> = BTreeMap::new();
        for row in capacity_rows.iter().filter(|row| row.slot_id == self.slot_id) {
            let class: VehicleClass = parse_enum(&row.vehicle_class)?;
            capacity_entries.push((class, parse_counter(row.capacity, "capacity")?));
            occupancy.insert(class, parse_counter(row.occupied, "occupied")?);
        }

        let pricing: PricingPolicy = serde_json::from_str(&self.pricing_json)?;
        if pricing.model().as_str() != self.pricing_model {
            return Err(PersistenceError::ReconstructionError(format!(
                "slot {} pricing model {} does not match stored policy {}",
                self.slot_id,
                self.pricing_model,
                pricing.model()
            )));
        }

        let verification: Option<Verification> = match (&self.verified_by, &self.verified_at) {
            (Some(verified_by), Some(verified_at)) => Some(Verification {
                verified_by: parse_actor(verified_by)?,
                verified_at: parse_timestamp(verified_at)?,
                rejection_reason: self.rejection_reason.clone(),
            }),
            _ => None,
        };

        Ok(Slot {
            slot_id: self.slot_id,
            owner: parse_actor(&self.owner_id)?,
            organization_id: self.organization_id,
            name: self.name,
            description: self.description,
            address: self.address,
            geo: GeoPoint::new(self.latitude, self.longitude)?,
            capacity: CapacityMap::from_entries(capacity_entries),
            occupancy,
            pricing,
            payment_timing: parse_enum::<PaymentTiming>(&self.payment_timing)?,
            status: parse_enum::<SlotStatus>(&self.status)?,
            verification,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = staff_assignments)]
pub struct StaffRow {
    pub assignment_id: i64,
    pub slot_id: i64,
    pub actor_id: String,
    pub role: String,
    pub created_at: String,
}

impl TryFrom<StaffRow> for StaffAssignment {
    type Error = PersistenceError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Self {
            assignment_id: row.assignment_id,
            slot_id: row.slot_id,
            actor: parse_actor(&row.actor_id)?,
            role: parse_enum::<StaffRole>(&row.role)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
pub struct OrganizationRow {
    pub organization_id: i64,
    pub name: String,
    pub status: String,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = PersistenceError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            organization_id: row.organization_id,
            name: row.name,
            status: parse_enum::<OrganizationStatus>(&row.status)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organization_members)]
pub struct MemberRow {
    pub organization_id: i64,
    pub actor_id: String,
    pub role: String,
}

impl TryFrom<MemberRow> for OrgMembership {
    type Error = PersistenceError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            organization_id: row.organization_id,
            actor: parse_actor(&row.actor_id)?,
            role: parse_enum::<OrgRole>(&row.role)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub struct SessionRow {
    pub session_id: i64,
    pub slot_id: i64,
    pub vehicle_number: String,
    pub vehicle_class: String,
    pub vehicle_owner_id: Option<String>,
    pub checked_in_by: String,
    pub checked_out_by: Option<String>,
    pub check_in_at: String,
    pub check_out_at: Option<String>,
    pub status: String,
    pub calculated_fee_cents: i64,
    pub collected_cents: i64,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
}

impl TryFrom<SessionRow> for Session {
    type Error = PersistenceError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            session_id: row.session_id,
            slot_id: row.slot_id,
            vehicle: VehicleNumber::parse(&row.vehicle_number)?,
            vehicle_class: parse_enum::<VehicleClass>(&row.vehicle_class)?,
            vehicle_owner: parse_optional_actor(row.vehicle_owner_id.as_deref())?,
            checked_in_by: parse_actor(&row.checked_in_by)?,
            checked_out_by: parse_optional_actor(row.checked_out_by.as_deref())?,
            check_in_at: parse_timestamp(&row.check_in_at)?,
            check_out_at: parse_optional_timestamp(row.check_out_at.as_deref())?,
            status: parse_enum::<SessionStatus>(&row.status)?,
            calculated_fee: Money::from_cents(row.calculated_fee_cents),
            collected: Money::from_cents(row.collected_cents),
            payment_method: parse_optional_enum::<PaymentMethod>(row.payment_method.as_deref())?,
            payment_status: parse_enum::<PaymentStatus>(&row.payment_status)?,
            notes: row.notes,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dues)]
pub struct DueRow {
    pub due_id: i64,
    pub vehicle_number: String,
    pub owner_id: String,
    pub session_id: i64,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub status: String,
    pub created_at: String,
    pub paid_at: Option<String>,
    pub collected_by: Option<String>,
    pub payment_method: Option<String>,
    pub payment_session_id: Option<i64>,
    pub notes: Option<String>,
}

impl TryFrom<DueRow> for Due {
    type Error = PersistenceError;

    fn try_from(row: DueRow) -> Result<Self, Self::Error> {
        Ok(Self {
            due_id: row.due_id,
            vehicle: VehicleNumber::parse(&row.vehicle_number)?,
            owner: parse_actor(&row.owner_id)?,
            session_id: row.session_id,
            amount_due: Money::from_cents(row.amount_due_cents),
            amount_paid: Money::from_cents(row.amount_paid_cents),
            status: parse_enum::<DueStatus>(&row.status)?,
            created_at: parse_timestamp(&row.created_at)?,
            paid_at: parse_optional_timestamp(row.paid_at.as_deref())?,
            collected_by: parse_optional_actor(row.collected_by.as_deref())?,
            payment_method: parse_optional_enum::<PaymentMethod>(row.payment_method.as_deref())?,
            payment_session_id: row.payment_session_id,
            notes: row.notes,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub slot_id: Option<i64>,
    pub actor_id: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_name: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub occurred_at: String,
}

/// An audit event as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub event_id: i64,
    pub slot_id: Option<i64>,
    pub actor_id: String,
    pub action: String,
    pub actor: serde_json::Value,
    pub cause: serde_json::Value,
    pub details: serde_json::Value,
    pub before: String,
    pub after: String,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl TryFrom<AuditEventRow> for AuditRecord {
    type Error = PersistenceError;

    fn try_from(row: AuditEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: row.event_id,
            slot_id: row.slot_id,
            actor_id: row.actor_id,
            action: row.action_name,
            actor: serde_json::from_str(&row.actor_json)?,
            cause: serde_json::from_str(&row.cause_json)?,
            details: serde_json::from_str(&row.action_json)?,
            before: row.before_snapshot_json,
            after: row.after_snapshot_json,
            occurred_at: parse_timestamp(&row.occurred_at)?,
        })
    }
}

/// Live `CHECKED_IN` session count for one class, used by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassDrift {
    pub vehicle_class: VehicleClass,
    pub capacity: u32,
    /// The stored counter.
    pub occupied: u32,
    /// Sessions actually checked in.
    pub checked_in: u32,
}

impl ClassDrift {
    /// Whether the counter disagrees with the sessions.
    #[must_use]
    pub const fn has_drift(&self) -> bool {
        self.occupied != self.checked_in
    }
}
