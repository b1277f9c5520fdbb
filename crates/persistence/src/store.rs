// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The store seen from inside one ledger transaction.
//!
//! [`LedgerStore`] is object safe so operations can be written once
//! against `&mut dyn LedgerStore` and run on either backend. Both
//! connection types implement it by forwarding to their `_sqlite` or
//! `_mysql` query and mutation functions.

use std::collections::BTreeMap;

use diesel::{MysqlConnection, SqliteConnection};
use parkledger::{SlotConfig, SlotStatusChange, StaffDraft};
use parkledger_audit::AuditEvent;
use parkledger_domain::{
    ActorId, Due, DueDraft, DuePayment, DueStatus, OrgMembership, Organization,
    OrganizationStatus, Session, SessionClosure, SessionDraft, SessionStatus, Slot, SlotDraft,
    SlotStatus, StaffAssignment, VehicleClass, VehicleNumber,
};
use time::OffsetDateTime;

use crate::data_models::{AuditRecord, CapacityRow};
use crate::error::PersistenceError;
use crate::{mutations, queries};

/// Session totals for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleTotals {
    /// Every session ever opened.
    pub total_sessions: i64,
    /// Sessions still `CHECKED_IN`.
    pub active_sessions: i64,
    /// Collected on `CHECKED_OUT` sessions, in cents.
    pub spent_cents: i64,
}

/// Ledger reads and writes available inside a transaction.
pub trait LedgerStore {
    // Oracles

    /// # Errors
    /// Returns an error if the query fails.
    fn find_organization(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<Organization>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_membership(
        &mut self,
        organization_id: i64,
        actor: &ActorId,
    ) -> Result<Option<OrgMembership>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_registered_owner(
        &mut self,
        vehicle: &VehicleNumber,
    ) -> Result<Option<ActorId>, PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn insert_organization(
        &mut self,
        name: &str,
        status: OrganizationStatus,
    ) -> Result<i64, PersistenceError>;

    /// # Errors
    /// Returns an error if the update fails.
    fn set_organization_status(
        &mut self,
        organization_id: i64,
        status: OrganizationStatus,
    ) -> Result<(), PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn insert_membership(&mut self, membership: &OrgMembership) -> Result<(), PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn register_vehicle(
        &mut self,
        vehicle: &VehicleNumber,
        owner: &ActorId,
    ) -> Result<(), PersistenceError>;

    // Slots

    /// # Errors
    /// Returns an error if the query fails.
    fn find_slot(&mut self, slot_id: i64) -> Result<Option<Slot>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_slots_by_status(
        &mut self,
        status: SlotStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Slot>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_slot_ids_for_owner(&mut self, owner: &ActorId) -> Result<Vec<i64>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_slots_for_owner(
        &mut self,
        owner: &ActorId,
        status: Option<SlotStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Slot>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_slot_ids_linked_to(&mut self, actor: &ActorId) -> Result<Vec<i64>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn load_capacity_rows(&mut self, slot_id: i64) -> Result<Vec<CapacityRow>, PersistenceError>;

    /// # Errors
    /// Returns an error if any insert fails.
    fn insert_slot(&mut self, draft: &SlotDraft) -> Result<i64, PersistenceError>;

    /// # Errors
    /// Returns an error if the update fails.
    fn update_slot_status(&mut self, change: &SlotStatusChange) -> Result<(), PersistenceError>;

    /// # Errors
    /// Returns an error if any write fails.
    fn update_slot_config(
        &mut self,
        slot_id: i64,
        config: &SlotConfig,
    ) -> Result<(), PersistenceError>;

    /// # Errors
    /// Returns an error if the update fails.
    fn mark_slot_deleted(&mut self, slot_id: i64) -> Result<(), PersistenceError>;

    // Capacity ledger

    /// Atomically takes a space. `false` means the class is full.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    fn try_occupy(
        &mut self,
        slot_id: i64,
        vehicle_class: VehicleClass,
    ) -> Result<bool, PersistenceError>;

    /// Atomically frees a space, flooring at zero. `false` means a floor hit.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    fn release(
        &mut self,
        slot_id: i64,
        vehicle_class: VehicleClass,
    ) -> Result<bool, PersistenceError>;

    // Staff

    /// # Errors
    /// Returns an error if the query fails.
    fn find_staff_assignment(
        &mut self,
        slot_id: i64,
        actor: &ActorId,
    ) -> Result<Option<StaffAssignment>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_staff_assignment_by_id(
        &mut self,
        assignment_id: i64,
    ) -> Result<Option<StaffAssignment>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_staff(&mut self, slot_id: i64) -> Result<Vec<StaffAssignment>, PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn insert_staff(
        &mut self,
        draft: &StaffDraft,
        created_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError>;

    /// # Errors
    /// Returns an error if nothing was removed.
    fn delete_staff(&mut self, assignment_id: i64) -> Result<(), PersistenceError>;

    // Sessions

    /// # Errors
    /// Returns an error if the query fails.
    fn find_checked_in_by_vehicle(
        &mut self,
        vehicle: &VehicleNumber,
    ) -> Result<Option<Session>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_checked_in_at_slot(
        &mut self,
        slot_id: i64,
        vehicle: &VehicleNumber,
    ) -> Result<Option<Session>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_session(&mut self, session_id: i64) -> Result<Option<Session>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn count_checked_in(&mut self, slot_id: i64) -> Result<i64, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn count_checked_in_by_class(
        &mut self,
        slot_id: i64,
    ) -> Result<BTreeMap<VehicleClass, u32>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_sessions_for_slot(
        &mut self,
        slot_id: i64,
        status: Option<SessionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Session>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_sessions_for_vehicle(
        &mut self,
        vehicle: &VehicleNumber,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Session>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn vehicle_totals(&mut self, vehicle: &VehicleNumber) -> Result<VehicleTotals, PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn insert_session(&mut self, draft: &SessionDraft) -> Result<i64, PersistenceError>;

    /// Closes an open session. `false` means it was no longer open.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    fn close_session(
        &mut self,
        session_id: i64,
        closure: &SessionClosure,
    ) -> Result<bool, PersistenceError>;

    // Dues

    /// # Errors
    /// Returns an error if the query fails.
    fn find_outstanding_due(
        &mut self,
        vehicle: &VehicleNumber,
        owner: &ActorId,
    ) -> Result<Option<Due>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn find_due(&mut self, due_id: i64) -> Result<Option<Due>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_dues_for_owner(
        &mut self,
        owner: &ActorId,
        status: Option<DueStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Due>, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_pending_dues_for_vehicle(
        &mut self,
        vehicle: &VehicleNumber,
    ) -> Result<Vec<Due>, PersistenceError>;

    /// # Errors
    /// Returns an error if the insert fails.
    fn insert_due(&mut self, draft: &DueDraft) -> Result<i64, PersistenceError>;

    /// Writes a due change if the due is unchanged since it was read.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    fn apply_due_payment(
        &mut self,
        due_id: i64,
        expected_paid_cents: i64,
        payment: &DuePayment,
    ) -> Result<bool, PersistenceError>;

    // Audit

    /// # Errors
    /// Returns an error if the insert fails.
    fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError>;

    /// # Errors
    /// Returns an error if the query fails.
    fn list_audit_events_for_slot(
        &mut self,
        slot_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditRecord>, PersistenceError>;
}

macro_rules! impl_ledger_store {
    ($conn:ty, $suffix:ident) => {
        pastey::paste! {
            impl LedgerStore for $conn {
                fn find_organization(
                    &mut self,
                    organization_id: i64,
                ) -> Result<Option<Organization>, PersistenceError> {
                    queries::oracles::[<find_organization_ $suffix>](self, organization_id)
                }

                fn find_membership(
                    &mut self,
                    organization_id: i64,
                    actor: &ActorId,
                ) -> Result<Option<OrgMembership>, PersistenceError> {
                    queries::oracles::[<find_membership_ $suffix>](self, organization_id, actor)
                }

                fn find_registered_owner(
                    &mut self,
                    vehicle: &VehicleNumber,
                ) -> Result<Option<ActorId>, PersistenceError> {
                    queries::oracles::[<find_registered_owner_ $suffix>](self, vehicle)
                }

                fn insert_organization(
                    &mut self,
                    name: &str,
                    status: OrganizationStatus,
                ) -> Result<i64, PersistenceError> {
                    mutations::oracles::[<insert_organization_ $suffix>](self, name, status)
                }

                fn set_organization_status(
                    &mut self,
                    organization_id: i64,
                    status: OrganizationStatus,
                ) -> Result<(), PersistenceError> {
                    mutations::oracles::[<set_organization_status_ $suffix>](
                        self,
                        organization_id,
                        status,
                    )
                }

                fn insert_membership(
                    &mut self,
                    membership: &OrgMembership,
                ) -> Result<(), PersistenceError> {
                    mutations::oracles::[<insert_membership_ $suffix>](self, membership)
                }

                fn register_vehicle(
                    &mut self,
                    vehicle: &VehicleNumber,
                    owner: &ActorId,
                ) -> Result<(), PersistenceError> {
                    mutations::oracles::[<register_vehicle_ $suffix>](self, vehicle, owner)
                }

                fn find_slot(&mut self, slot_id: i64) -> Result<Option<Slot>, PersistenceError> {
                    queries::slots::[<find_slot_ $suffix>](self, slot_id)
                }

                fn list_slots_by_status(
                    &mut self,
                    status: SlotStatus,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<Slot>, PersistenceError> {
                    queries::slots::[<list_slots_by_status_ $suffix>](self, status, limit, offset)
                }

                fn list_slot_ids_for_owner(
                    &mut self,
                    owner: &ActorId,
                ) -> Result<Vec<i64>, PersistenceError> {
                    queries::slots::[<list_slot_ids_for_owner_ $suffix>](self, owner)
                }

                fn list_slots_for_owner(
                    &mut self,
                    owner: &ActorId,
                    status: Option<SlotStatus>,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<Slot>, PersistenceError> {
                    queries::slots::[<list_slots_for_owner_ $suffix>](
                        self, owner, status, limit, offset,
                    )
                }

                fn list_slot_ids_linked_to(
                    &mut self,
                    actor: &ActorId,
                ) -> Result<Vec<i64>, PersistenceError> {
                    queries::slots::[<list_slot_ids_linked_to_ $suffix>](self, actor)
                }

                fn load_capacity_rows(
                    &mut self,
                    slot_id: i64,
                ) -> Result<Vec<CapacityRow>, PersistenceError> {
                    queries::slots::[<load_capacity_rows_ $suffix>](self, slot_id)
                }

                fn insert_slot(&mut self, draft: &SlotDraft) -> Result<i64, PersistenceError> {
                    mutations::slots::[<insert_slot_ $suffix>](self, draft)
                }

                fn update_slot_status(
                    &mut self,
                    change: &SlotStatusChange,
                ) -> Result<(), PersistenceError> {
                    mutations::slots::[<update_slot_status_ $suffix>](self, change)
                }

                fn update_slot_config(
                    &mut self,
                    slot_id: i64,
                    config: &SlotConfig,
                ) -> Result<(), PersistenceError> {
                    mutations::slots::[<update_slot_config_ $suffix>](self, slot_id, config)
                }

                fn mark_slot_deleted(&mut self, slot_id: i64) -> Result<(), PersistenceError> {
                    mutations::slots::[<mark_slot_deleted_ $suffix>](self, slot_id)
                }

                fn try_occupy(
                    &mut self,
                    slot_id: i64,
                    vehicle_class: VehicleClass,
                ) -> Result<bool, PersistenceError> {
                    mutations::capacity::[<try_occupy_ $suffix>](self, slot_id, vehicle_class)
                }

                fn release(
                    &mut self,
                    slot_id: i64,
                    vehicle_class: VehicleClass,
                ) -> Result<bool, PersistenceError> {
                    mutations::capacity::[<release_ $suffix>](self, slot_id, vehicle_class)
                }

                fn find_staff_assignment(
                    &mut self,
                    slot_id: i64,
                    actor: &ActorId,
                ) -> Result<Option<StaffAssignment>, PersistenceError> {
                    queries::staff::[<find_staff_assignment_ $suffix>](self, slot_id, actor)
                }

                fn find_staff_assignment_by_id(
                    &mut self,
                    assignment_id: i64,
                ) -> Result<Option<StaffAssignment>, PersistenceError> {
                    queries::staff::[<find_staff_assignment_by_id_ $suffix>](self, assignment_id)
                }

                fn list_staff(
                    &mut self,
                    slot_id: i64,
                ) -> Result<Vec<StaffAssignment>, PersistenceError> {
                    queries::staff::[<list_staff_ $suffix>](self, slot_id)
                }

                fn insert_staff(
                    &mut self,
                    draft: &StaffDraft,
                    created_at: OffsetDateTime,
                ) -> Result<i64, PersistenceError> {
                    mutations::staff::[<insert_staff_ $suffix>](self, draft, created_at)
                }

                fn delete_staff(&mut self, assignment_id: i64) -> Result<(), PersistenceError> {
                    mutations::staff::[<delete_staff_ $suffix>](self, assignment_id)
                }

                fn find_checked_in_by_vehicle(
                    &mut self,
                    vehicle: &VehicleNumber,
                ) -> Result<Option<Session>, PersistenceError> {
                    queries::sessions::[<find_checked_in_by_vehicle_ $suffix>](self, vehicle)
                }

                fn find_checked_in_at_slot(
                    &mut self,
                    slot_id: i64,
                    vehicle: &VehicleNumber,
                ) -> Result<Option<Session>, PersistenceError> {
                    queries::sessions::[<find_checked_in_at_slot_ $suffix>](self, slot_id, vehicle)
                }

                fn find_session(
                    &mut self,
                    session_id: i64,
                ) -> Result<Option<Session>, PersistenceError> {
                    queries::sessions::[<find_session_ $suffix>](self, session_id)
                }

                fn count_checked_in(&mut self, slot_id: i64) -> Result<i64, PersistenceError> {
                    queries::sessions::[<count_checked_in_ $suffix>](self, slot_id)
                }

                fn count_checked_in_by_class(
                    &mut self,
                    slot_id: i64,
                ) -> Result<BTreeMap<VehicleClass, u32>, PersistenceError> {
                    queries::sessions::[<count_checked_in_by_class_ $suffix>](self, slot_id)
                }

                fn list_sessions_for_slot(
                    &mut self,
                    slot_id: i64,
                    status: Option<SessionStatus>,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<Session>, PersistenceError> {
                    queries::sessions::[<list_sessions_for_slot_ $suffix>](
                        self, slot_id, status, limit, offset,
                    )
                }

                fn list_sessions_for_vehicle(
                    &mut self,
                    vehicle: &VehicleNumber,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<Session>, PersistenceError> {
                    queries::sessions::[<list_sessions_for_vehicle_ $suffix>](
                        self, vehicle, limit, offset,
                    )
                }

                fn vehicle_totals(
                    &mut self,
                    vehicle: &VehicleNumber,
                ) -> Result<VehicleTotals, PersistenceError> {
                    let (total_sessions, active_sessions, spent_cents) =
                        queries::sessions::[<vehicle_session_totals_ $suffix>](self, vehicle)?;
                    Ok(VehicleTotals {
                        total_sessions,
                        active_sessions,
                        spent_cents,
                    })
                }

                fn insert_session(
                    &mut self,
                    draft: &SessionDraft,
                ) -> Result<i64, PersistenceError> {
                    mutations::sessions::[<insert_session_ $suffix>](self, draft)
                }

                fn close_session(
                    &mut self,
                    session_id: i64,
                    closure: &SessionClosure,
                ) -> Result<bool, PersistenceError> {
                    mutations::sessions::[<close_session_ $suffix>](self, session_id, closure)
                }

                fn find_outstanding_due(
                    &mut self,
                    vehicle: &VehicleNumber,
                    owner: &ActorId,
                ) -> Result<Option<Due>, PersistenceError> {
                    queries::dues::[<find_outstanding_due_ $suffix>](self, vehicle, owner)
                }

                fn find_due(&mut self, due_id: i64) -> Result<Option<Due>, PersistenceError> {
                    queries::dues::[<find_due_ $suffix>](self, due_id)
                }

                fn list_dues_for_owner(
                    &mut self,
                    owner: &ActorId,
                    status: Option<DueStatus>,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<Due>, PersistenceError> {
                    queries::dues::[<list_dues_for_owner_ $suffix>](
                        self, owner, status, limit, offset,
                    )
                }

                fn list_pending_dues_for_vehicle(
                    &mut self,
                    vehicle: &VehicleNumber,
                ) -> Result<Vec<Due>, PersistenceError> {
                    queries::dues::[<list_pending_dues_for_vehicle_ $suffix>](self, vehicle)
                }

                fn insert_due(&mut self, draft: &DueDraft) -> Result<i64, PersistenceError> {
                    mutations::dues::[<insert_due_ $suffix>](self, draft)
                }

                fn apply_due_payment(
                    &mut self,
                    due_id: i64,
                    expected_paid_cents: i64,
                    payment: &DuePayment,
                ) -> Result<bool, PersistenceError> {
                    mutations::dues::[<apply_due_payment_ $suffix>](
                        self,
                        due_id,
                        expected_paid_cents,
                        payment,
                    )
                }

                fn persist_audit_event(
                    &mut self,
                    event: &AuditEvent,
                ) -> Result<i64, PersistenceError> {
                    mutations::audit::[<persist_audit_event_ $suffix>](self, event)
                }

                fn list_audit_events_for_slot(
                    &mut self,
                    slot_id: i64,
                    limit: i64,
                    offset: i64,
                ) -> Result<Vec<AuditRecord>, PersistenceError> {
                    queries::audit::[<list_audit_events_for_slot_ $suffix>](
                        self, slot_id, limit, offset,
                    )
                }
            }
        }
    };
}

impl_ledger_store!(SqliteConnection, sqlite);
impl_ledger_store!(MysqlConnection, mysql);
