// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::Serialize;

wire_enum! {
    /// Role on a slot's own staff list.
    pub enum StaffRole {
        /// The slot's creator. Created with the slot, never removed.
        Owner => "OWNER",
        /// Paid operator.
        Staff => "STAFF",
        /// Unpaid operator.
        Volunteer => "VOLUNTEER",
    }
}

impl StaffRole {
    /// Maps the staff role to the access it grants.
    #[must_use]
    pub const fn access_level(self) -> AccessLevel {
        match self {
            Self::Owner => AccessLevel::OwnerOrAdmin,
            Self::Staff | Self::Volunteer => AccessLevel::StaffOrManager,
        }
    }
}

wire_enum! {
    /// Role inside an organization, as reported by the membership directory.
    pub enum OrgRole {
        /// Runs the organization.
        OrgAdmin => "ORG_ADMIN",
        /// Manages a group of the organization's slots.
        AreaManager => "AREA_MANAGER",
        /// Works the gate.
        GroundStaff => "GROUND_STAFF",
    }
}

impl OrgRole {
    /// Maps the organization role to the access it grants.
    #[must_use]
    pub const fn access_level(self) -> AccessLevel {
        match self {
            Self::OrgAdmin | Self::AreaManager => AccessLevel::OwnerOrAdmin,
            Self::GroundStaff => AccessLevel::StaffOrManager,
        }
    }
}

/// Effective permission level on a slot, ordered weakest first.
///
/// Administrative access implies operational access, so checks compare with
/// [`AccessLevel::satisfies`] rather than equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// No relationship with the slot.
    None,
    /// May operate the gate: check-in, check-out, escapes, due collection.
    StaffOrManager,
    /// May also configure the slot and manage its staff.
    OwnerOrAdmin,
}

impl AccessLevel {
    /// Returns the stable name of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::StaffOrManager => "STAFF_OR_MANAGER",
            Self::OwnerOrAdmin => "OWNER_OR_ADMIN",
        }
    }

    /// Returns whether this level grants at least `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self != Self::None && self >= required
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The concrete role that produced an access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlotRole {
    /// Held through the slot's staff list.
    Staff(StaffRole),
    /// Held through organization membership.
    Organization(OrgRole),
}

impl SlotRole {
    /// Returns the stable name of the underlying role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff(role) => role.as_str(),
            Self::Organization(role) => role.as_str(),
        }
    }
}

impl std::fmt::Display for SlotRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving an actor against a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveRole {
    /// The access level granted.
    pub level: AccessLevel,
    /// The role behind it, absent for [`AccessLevel::None`].
    pub role: Option<SlotRole>,
}

impl EffectiveRole {
    /// No relationship with the slot.
    pub const NONE: Self = Self {
        level: AccessLevel::None,
        role: None,
    };

    /// Access granted through a staff-list role.
    #[must_use]
    pub const fn from_staff(role: StaffRole) -> Self {
        Self {
            level: role.access_level(),
            role: Some(SlotRole::Staff(role)),
        }
    }

    /// Access granted through organization membership.
    #[must_use]
    pub const fn from_organization(role: OrgRole) -> Self {
        Self {
            level: role.access_level(),
            role: Some(SlotRole::Organization(role)),
        }
    }
}
