// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use parkledger_domain::{Money, PricingModel, SlotStatus, StaffAssignment, StaffRole, VehicleClass};
use parkledger_persistence::Persistence;
use serde_json::json;

use super::helpers::{
    T0, add_test_staff, at, check_in_car, check_out_with, create_active_slot, create_test_admin,
    create_test_cause, create_test_owner, create_test_persistence, create_test_staff,
    fixed_request, hourly_car_request, slot_request,
};
use crate::{
    AddStaffRequest, ApiError, LedgerConfig, SlotResponse, UpdateSlotRequest, VerifySlotRequest,
    add_staff, create_slot, deactivate_slot, delete_slot, get_slot, list_staff, reactivate_slot,
    remove_staff, update_slot, verify_slot,
};

fn decide(
    persistence: &mut Persistence,
    slot_id: i64,
    approve: bool,
    rejection_reason: Option<&str>,
) -> Result<SlotResponse, ApiError> {
    verify_slot(
        persistence,
        slot_id,
        &VerifySlotRequest {
            approve,
            rejection_reason: rejection_reason.map(String::from),
        },
        &create_test_admin(),
        create_test_cause(),
        T0,
    )
}

fn register(persistence: &mut Persistence) -> i64 {
    create_slot(
        persistence,
        &fixed_request(),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap()
    .slot
    .slot_id
}

#[test]
fn test_new_slot_awaits_verification_with_owner_assignment() {
    let mut persistence: Persistence = create_test_persistence();

    let created: SlotResponse = create_slot(
        &mut persistence,
        &fixed_request(),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap();
    assert_eq!(created.slot.status, SlotStatus::PendingVerification);
    assert_eq!(created.slot.owner, create_test_owner().id);
    assert_eq!(created.availability.len(), 2);
    assert!(created.availability.iter().all(|class| class.occupied == 0));

    let staff = persistence
        .read(|store| store.list_staff(created.slot.slot_id))
        .unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].role, StaffRole::Owner);
    assert_eq!(staff[0].actor, create_test_owner().id);
}

#[test]
fn test_zero_capacity_classes_are_dropped() {
    let mut persistence: Persistence = create_test_persistence();

    let created: SlotResponse = create_slot(
        &mut persistence,
        &slot_request(
            "Depot",
            PricingModel::Free,
            None,
            &[(VehicleClass::Car, 4), (VehicleClass::Truck, 0)],
        ),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap();
    assert_eq!(created.availability.len(), 1);
    assert_eq!(created.availability[0].vehicle_class, VehicleClass::Car);
    assert_eq!(created.slot.capacity.get(VehicleClass::Truck), 0);
}

#[test]
fn test_paid_models_need_complete_pricing() {
    let mut persistence: Persistence = create_test_persistence();
    let capacity: [(VehicleClass, u32); 2] = [(VehicleClass::Car, 2), (VehicleClass::Bike, 1)];

    let err: ApiError = create_slot(
        &mut persistence,
        &slot_request("Lot", PricingModel::Fixed, None, &capacity),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "MISSING_PRICING_CONFIG");

    let err: ApiError = create_slot(
        &mut persistence,
        &slot_request("Lot", PricingModel::Fixed, Some(json!({ "CAR": 50 })), &capacity),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INCOMPLETE_PRICING_CONFIG");

    let err: ApiError = create_slot(
        &mut persistence,
        &slot_request(
            "Lot",
            PricingModel::Hourly,
            Some(json!({
                "CAR": { "base": 30, "base_hours": 0, "incremental": 10 },
                "BIKE": { "base": 10, "incremental": 5 },
            })),
            &capacity,
        ),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_pricing_beyond_storable_amounts_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let err: ApiError = create_slot(
        &mut persistence,
        &slot_request(
            "Lot",
            PricingModel::Hourly,
            Some(json!({ "CAR": { "base": 10, "incremental": 1e27 } })),
            &[(VehicleClass::Car, 2)],
        ),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_rejected_slot_stays_frozen() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = register(&mut persistence);
    decide(&mut persistence, slot_id, false, Some("Address does not exist")).unwrap();

    let err: ApiError = update_slot(
        &mut persistence,
        slot_id,
        &UpdateSlotRequest {
            name: Some(String::from("Second Attempt")),
            ..UpdateSlotRequest::default()
        },
        &create_test_owner(),
        create_test_cause(),
        at(1),
    )
    .unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_PENDING");

    let slot = get_slot(&mut persistence, slot_id, &create_test_owner()).unwrap();
    assert_eq!(slot.slot.name, "Market Street Lot");
    assert_eq!(slot.slot.status, SlotStatus::Rejected);
}

#[test]
fn test_slot_without_capacity_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();

    let err: ApiError = create_slot(
        &mut persistence,
        &slot_request("Empty", PricingModel::Free, None, &[(VehicleClass::Car, 0)]),
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn test_verification_is_decided_once() {
    let mut persistence: Persistence = create_test_persistence();
    let approved: i64 = register(&mut persistence);
    let rejected: i64 = register(&mut persistence);

    let response: SlotResponse = decide(&mut persistence, approved, true, None).unwrap();
    assert_eq!(response.slot.status, SlotStatus::Active);
    assert_eq!(
        response.slot.verification.unwrap().verified_by,
        create_test_admin().id
    );
    let err: ApiError = decide(&mut persistence, approved, false, Some("Too late")).unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_PENDING");

    let err: ApiError = decide(&mut persistence, rejected, false, None).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    let response: SlotResponse =
        decide(&mut persistence, rejected, false, Some("Address does not exist")).unwrap();
    assert_eq!(response.slot.status, SlotStatus::Rejected);
}

#[test]
fn test_deactivate_edit_reactivate_cycle() {
    let mut persistence: Persistence = create_test_persistence();
    let config: LedgerConfig = LedgerConfig::default();
    let slot_id: i64 = create_active_slot(&mut persistence, &hourly_car_request());
    let session_id: i64 = check_in_car(&mut persistence, slot_id, "AB12CD3456", at(0))
        .unwrap()
        .session
        .session_id;

    let err: ApiError =
        deactivate_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(1))
            .unwrap_err();
    assert_eq!(err.code(), "ACTIVE_SESSIONS_EXIST");

    let edit: UpdateSlotRequest = UpdateSlotRequest {
        capacity: Some(BTreeMap::from([(VehicleClass::Car, 5)])),
        ..UpdateSlotRequest::default()
    };
    let err: ApiError = update_slot(
        &mut persistence,
        slot_id,
        &edit,
        &create_test_owner(),
        create_test_cause(),
        at(2),
    )
    .unwrap_err();
    assert_eq!(err.code(), "SLOT_ACTIVE");

    check_out_with(&mut persistence, &config, session_id, Money::from_cents(3_000), at(3))
        .unwrap();
    let inactive: SlotResponse =
        deactivate_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(4))
            .unwrap();
    assert_eq!(inactive.slot.status, SlotStatus::Inactive);

    let err: ApiError = check_in_car(&mut persistence, slot_id, "KA01AB1234", at(5)).unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_ACTIVE");

    let edited: SlotResponse = update_slot(
        &mut persistence,
        slot_id,
        &edit,
        &create_test_owner(),
        create_test_cause(),
        at(6),
    )
    .unwrap();
    assert_eq!(edited.slot.capacity.get(VehicleClass::Car), 5);
    assert_eq!(edited.availability[0].available, 5);

    let active: SlotResponse =
        reactivate_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(7))
            .unwrap();
    assert_eq!(active.slot.status, SlotStatus::Active);
    let err: ApiError =
        reactivate_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(8))
            .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn test_edit_adding_unpriced_class_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    deactivate_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(0))
        .unwrap();

    let err: ApiError = update_slot(
        &mut persistence,
        slot_id,
        &UpdateSlotRequest {
            capacity: Some(BTreeMap::from([
                (VehicleClass::Car, 2),
                (VehicleClass::Truck, 1),
            ])),
            ..UpdateSlotRequest::default()
        },
        &create_test_owner(),
        create_test_cause(),
        at(1),
    )
    .unwrap_err();
    assert_eq!(err.code(), "INCOMPLETE_PRICING_CONFIG");

    let edited: SlotResponse = update_slot(
        &mut persistence,
        slot_id,
        &UpdateSlotRequest {
            name: Some(String::from("Market Street Lot East")),
            capacity: Some(BTreeMap::from([
                (VehicleClass::Car, 2),
                (VehicleClass::Truck, 1),
            ])),
            pricing_config: Some(json!({ "CAR": 50, "TRUCK": 120 })),
            ..UpdateSlotRequest::default()
        },
        &create_test_owner(),
        create_test_cause(),
        at(2),
    )
    .unwrap();
    assert_eq!(edited.slot.name, "Market Street Lot East");
    assert_eq!(edited.slot.capacity.get(VehicleClass::Bike), 0);
    assert_eq!(edited.slot.capacity.get(VehicleClass::Truck), 1);
}

#[test]
fn test_deleted_slot_disappears() {
    let mut persistence: Persistence = create_test_persistence();
    let config: LedgerConfig = LedgerConfig::default();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let session_id: i64 = check_in_car(&mut persistence, slot_id, "AB12CD3456", at(0))
        .unwrap()
        .session
        .session_id;

    let err: ApiError =
        delete_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(1))
            .unwrap_err();
    assert_eq!(err.code(), "ACTIVE_SESSIONS_EXIST");

    check_out_with(&mut persistence, &config, session_id, Money::from_cents(5_000), at(2))
        .unwrap();
    delete_slot(&mut persistence, slot_id, &create_test_owner(), create_test_cause(), at(3))
        .unwrap();

    let err: ApiError = get_slot(&mut persistence, slot_id, &create_test_owner()).unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_FOUND");
    let err: ApiError = check_in_car(&mut persistence, slot_id, "AB12CD3456", at(4)).unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_FOUND");
}

#[test]
fn test_staff_list_rules() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let assignment_id: i64 = add_test_staff(&mut persistence, slot_id, StaffRole::Staff);

    let add = |persistence: &mut Persistence, actor_id: &str, role: StaffRole| {
        add_staff(
            persistence,
            slot_id,
            &AddStaffRequest {
                actor_id: actor_id.to_string(),
                role,
            },
            &create_test_owner(),
            create_test_cause(),
            T0,
        )
    };

    let err: ApiError = add(&mut persistence, "staff-1", StaffRole::Volunteer).unwrap_err();
    assert_eq!(err.code(), "ALREADY_STAFF");
    let err: ApiError = add(&mut persistence, "helper-9", StaffRole::Owner).unwrap_err();
    assert_eq!(err.code(), "OWNER_AS_STAFF");
    add(&mut persistence, "helper-9", StaffRole::Volunteer).unwrap();

    let listed: Vec<StaffAssignment> = list_staff(&mut persistence, slot_id, &create_test_owner())
        .unwrap()
        .staff;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].role, StaffRole::Owner);

    let err: ApiError = remove_staff(
        &mut persistence,
        slot_id,
        listed[0].assignment_id,
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "CANNOT_REMOVE_OWNER");

    remove_staff(
        &mut persistence,
        slot_id,
        assignment_id,
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap();
    let err: ApiError = remove_staff(
        &mut persistence,
        slot_id,
        assignment_id,
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "STAFF_NOT_FOUND");

    // Removed staff lose access immediately.
    let err: ApiError = get_slot(&mut persistence, slot_id, &create_test_staff()).unwrap_err();
    assert_eq!(err.code(), "NOT_AUTHORIZED");
}

#[test]
fn test_staff_changes_require_active_slot() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = register(&mut persistence);

    let err: ApiError = add_staff(
        &mut persistence,
        slot_id,
        &AddStaffRequest {
            actor_id: String::from("staff-1"),
            role: StaffRole::Staff,
        },
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap_err();
    assert_eq!(err.code(), "SLOT_NOT_ACTIVE");
}
