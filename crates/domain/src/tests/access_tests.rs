// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AccessLevel, EffectiveRole, OrgRole, SlotRole, StaffRole};

#[test]
fn test_administrative_access_implies_operational() {
    assert!(AccessLevel::OwnerOrAdmin.satisfies(AccessLevel::StaffOrManager));
    assert!(AccessLevel::OwnerOrAdmin.satisfies(AccessLevel::OwnerOrAdmin));
    assert!(AccessLevel::StaffOrManager.satisfies(AccessLevel::StaffOrManager));
    assert!(!AccessLevel::StaffOrManager.satisfies(AccessLevel::OwnerOrAdmin));
}

#[test]
fn test_no_access_never_satisfies() {
    assert!(!AccessLevel::None.satisfies(AccessLevel::None));
    assert!(!AccessLevel::None.satisfies(AccessLevel::StaffOrManager));
}

#[test]
fn test_staff_roles_map_to_levels() {
    assert_eq!(StaffRole::Owner.access_level(), AccessLevel::OwnerOrAdmin);
    assert_eq!(StaffRole::Staff.access_level(), AccessLevel::StaffOrManager);
    assert_eq!(
        StaffRole::Volunteer.access_level(),
        AccessLevel::StaffOrManager
    );
}

#[test]
fn test_org_roles_map_to_levels() {
    assert_eq!(OrgRole::OrgAdmin.access_level(), AccessLevel::OwnerOrAdmin);
    assert_eq!(OrgRole::AreaManager.access_level(), AccessLevel::OwnerOrAdmin);
    assert_eq!(
        OrgRole::GroundStaff.access_level(),
        AccessLevel::StaffOrManager
    );
}

#[test]
fn test_effective_role_keeps_the_source_role() {
    let role: EffectiveRole = EffectiveRole::from_organization(OrgRole::GroundStaff);
    assert_eq!(role.role, Some(SlotRole::Organization(OrgRole::GroundStaff)));
    assert_eq!(role.role.unwrap().to_string(), "GROUND_STAFF");
    assert_eq!(EffectiveRole::NONE.level, AccessLevel::None);
}
