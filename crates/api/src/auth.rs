// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor identity, the role resolver, and authorization checks.
//!
//! A slot resolves roles through exactly one of two schemes: its own staff
//! list, or membership in the organization that owns it. [`resolve_role`]
//! picks the scheme from the slot; nothing else in the crate looks at the
//! distinction.

use parkledger_audit::Actor;
use parkledger_domain::{AccessLevel, ActorId, EffectiveRole, OrgMembership, Slot};
use parkledger_persistence::{LedgerStore, PersistenceError};
use tracing::debug;

use crate::error::{ApiError, AuthError};

/// Platform-level roles carried by the verified identity.
///
/// These are independent of any role an actor holds on a particular slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Platform administrator: verifies slots and runs reconciliation.
    Admin,
    /// Any other verified user.
    Member,
}

/// A verified identity handed to the ledger by the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: ActorId,
    /// The platform role of this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates an authenticated actor from a raw identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] for a blank identity.
    pub fn new(id: &str, role: Role) -> Result<Self, AuthError> {
        let id: ActorId = ActorId::new(id).map_err(|_| AuthError::AuthenticationFailed {
            reason: String::from("actor identity is empty"),
        })?;
        Ok(Self { id, role })
    }

    /// Returns whether this actor is a platform administrator.
    #[must_use]
    pub const fn is_platform_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        match self.role {
            Role::Admin => Actor::admin(self.id.clone()),
            Role::Member => Actor::user(self.id.clone()),
        }
    }
}

/// One way of answering "what may this actor do on this slot".
pub trait RoleStrategy {
    /// Resolves the actor's effective role on `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn resolve(
        &self,
        store: &mut dyn LedgerStore,
        actor: &ActorId,
        slot: &Slot,
    ) -> Result<EffectiveRole, PersistenceError>;
}

/// Resolves through the slot's own staff list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffListStrategy;

impl RoleStrategy for StaffListStrategy {
    fn resolve(
        &self,
        store: &mut dyn LedgerStore,
        actor: &ActorId,
        slot: &Slot,
    ) -> Result<EffectiveRole, PersistenceError> {
        Ok(store
            .find_staff_assignment(slot.slot_id, actor)?
            .map_or(EffectiveRole::NONE, |assignment| {
                EffectiveRole::from_staff(assignment.role)
            }))
    }
}

/// Resolves through membership in the organization owning the slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationStrategy;

impl RoleStrategy for OrganizationStrategy {
    fn resolve(
        &self,
        store: &mut dyn LedgerStore,
        actor: &ActorId,
        slot: &Slot,
    ) -> Result<EffectiveRole, PersistenceError> {
        let Some(organization_id) = slot.organization_id else {
            return Ok(EffectiveRole::NONE);
        };
        let membership: Option<OrgMembership> = store.find_membership(organization_id, actor)?;
        Ok(membership.map_or(EffectiveRole::NONE, |membership| {
            EffectiveRole::from_organization(membership.role)
        }))
    }
}

/// Returns the strategy a slot resolves roles with.
#[must_use]
pub fn strategy_for(slot: &Slot) -> &'static dyn RoleStrategy {
    if slot.is_organization_slot() {
        &OrganizationStrategy
    } else {
        &StaffListStrategy
    }
}

/// Resolves an actor's effective role on a slot.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn resolve_role(
    store: &mut dyn LedgerStore,
    actor: &ActorId,
    slot: &Slot,
) -> Result<EffectiveRole, PersistenceError> {
    let role: EffectiveRole = strategy_for(slot).resolve(store, actor, slot)?;
    debug!(slot_id = slot.slot_id, %actor, level = %role.level, "Resolved role");
    Ok(role)
}

/// Authorization checks shared by every operation.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is a platform administrator.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PlatformAdminRequired`] otherwise.
    pub fn authorize_platform_admin(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_platform_admin() {
            Ok(())
        } else {
            Err(AuthError::PlatformAdminRequired {
                action: action.to_string(),
            })
        }
    }

    /// Checks that a resolved role meets `required`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthorized`] when the actor has no role at all
    /// - [`AuthError::InsufficientRole`] when the role is too weak
    pub fn check_level(
        role: EffectiveRole,
        required: AccessLevel,
        action: &str,
    ) -> Result<(), AuthError> {
        if role.level.satisfies(required) {
            return Ok(());
        }
        match role.role {
            None => Err(AuthError::NotAuthorized {
                action: action.to_string(),
            }),
            Some(actual) => Err(AuthError::InsufficientRole {
                action: action.to_string(),
                required_role: required.to_string(),
                actual_role: actual.to_string(),
            }),
        }
    }

    /// Resolves the actor on a slot and checks the required level.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when the level is not met, or an
    /// internal error if the lookup fails.
    pub fn authorize_slot(
        store: &mut dyn LedgerStore,
        actor: &AuthenticatedActor,
        slot: &Slot,
        required: AccessLevel,
        action: &str,
    ) -> Result<EffectiveRole, ApiError> {
        let role: EffectiveRole = resolve_role(store, &actor.id, slot)?;
        Self::check_level(role, required, action)?;
        Ok(role)
    }

    /// Checks the actor against every live slot of `owner` and returns the
    /// first slot where the required level is met.
    ///
    /// Dues belong to an owner rather than a slot, so rights on any one of
    /// the owner's slots are enough.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when no slot grants the level, or an
    /// internal error if a lookup fails.
    pub fn authorize_owner_scope(
        store: &mut dyn LedgerStore,
        actor: &AuthenticatedActor,
        owner: &ActorId,
        required: AccessLevel,
        action: &str,
    ) -> Result<i64, ApiError> {
        let mut strongest: EffectiveRole = EffectiveRole::NONE;
        for slot_id in store.list_slot_ids_for_owner(owner)? {
            let Some(slot) = store.find_slot(slot_id)? else {
                continue;
            };
            let role: EffectiveRole = resolve_role(store, &actor.id, &slot)?;
            if role.level.satisfies(required) {
                return Ok(slot_id);
            }
            if role.level > strongest.level {
                strongest = role;
            }
        }
        Err(Self::check_level(strongest, required, action)
            .err()
            .unwrap_or_else(|| AuthError::NotAuthorized {
                action: action.to_string(),
            })
            .into())
    }
}
