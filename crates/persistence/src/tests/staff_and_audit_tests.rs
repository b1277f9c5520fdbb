// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger::StaffDraft;
use parkledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use parkledger_domain::{
    ActorId, OrgMembership, OrgRole, OrganizationStatus, StaffAssignment, StaffRole,
};

use super::{create_test_owner, create_test_time, insert_active_slot};
use crate::{AuditRecord, LedgerStore, Persistence, PersistenceError};

fn staff_draft(slot_id: i64, actor: &str) -> StaffDraft {
    StaffDraft {
        slot_id,
        actor: ActorId::new(actor).unwrap(),
        role: StaffRole::Staff,
    }
}

#[test]
fn test_staff_assignment_lifecycle() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let slot_id: i64 = insert_active_slot(&mut persistence);

    let assignment_id: i64 = persistence
        .in_transaction(|store| store.insert_staff(&staff_draft(slot_id, "gate-1"), create_test_time()))
        .unwrap();

    let found: Option<StaffAssignment> = persistence
        .read(|store| store.find_staff_assignment(slot_id, &ActorId::new("gate-1").unwrap()))
        .unwrap();
    assert_eq!(found.unwrap().assignment_id, assignment_id);

    persistence
        .in_transaction(|store| store.delete_staff(assignment_id))
        .unwrap();
    let gone = persistence
        .read(|store| store.find_staff_assignment_by_id(assignment_id))
        .unwrap();
    assert!(gone.is_none());
}

#[test]
fn test_duplicate_staff_is_a_unique_violation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let slot_id: i64 = insert_active_slot(&mut persistence);
    persistence
        .in_transaction(|store| store.insert_staff(&staff_draft(slot_id, "gate-1"), create_test_time()))
        .unwrap();

    let again = persistence.in_transaction(|store| {
        store.insert_staff(&staff_draft(slot_id, "gate-1"), create_test_time())
    });

    assert!(matches!(again, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_delete_missing_staff_is_not_found() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.in_transaction(|store| store.delete_staff(999));

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_organization_oracle_round_trip() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let member = ActorId::new("area-lead").unwrap();

    let organization_id: i64 = persistence
        .in_transaction(|store| {
            let organization_id: i64 =
                store.insert_organization("City Parking Co", OrganizationStatus::Active)?;
            store.insert_membership(&OrgMembership {
                organization_id,
                actor: member.clone(),
                role: OrgRole::AreaManager,
            })?;
            store.set_organization_status(organization_id, OrganizationStatus::Suspended)?;
            Ok::<i64, PersistenceError>(organization_id)
        })
        .unwrap();

    let (organization, membership) = persistence
        .read(|store| {
            Ok::<_, PersistenceError>((
                store.find_organization(organization_id)?,
                store.find_membership(organization_id, &member)?,
            ))
        })
        .unwrap();

    assert_eq!(organization.unwrap().status, OrganizationStatus::Suspended);
    assert_eq!(membership.unwrap().role, OrgRole::AreaManager);
}

#[test]
fn test_audit_events_are_listed_per_slot_in_order() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let slot_id: i64 = insert_active_slot(&mut persistence);
    let other_slot: i64 = insert_active_slot(&mut persistence);

    let event = |name: &str, slot: i64| {
        AuditEvent::new(
            Actor::user(create_test_owner()),
            Cause::new(String::from("test-cause"), String::from("Test operation")),
            Action::new(name.to_string(), Some(String::from("details"))),
            Some(slot),
            StateSnapshot::absent(),
            StateSnapshot::new(String::from("after")),
            create_test_time(),
        )
    };

    persistence
        .in_transaction(|store| {
            store.persist_audit_event(&event("CheckIn", slot_id))?;
            store.persist_audit_event(&event("CheckIn", other_slot))?;
            store.persist_audit_event(&event("CheckOut", slot_id))
        })
        .unwrap();

    let records: Vec<AuditRecord> = persistence
        .read(|store| store.list_audit_events_for_slot(slot_id, 50, 0))
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action, "CheckIn");
    assert_eq!(records[1].action, "CheckOut");
    assert_eq!(records[0].actor_id, "owner-1");
    assert_eq!(records[1].after, "after");
    assert_eq!(records[0].occurred_at, create_test_time());
}
