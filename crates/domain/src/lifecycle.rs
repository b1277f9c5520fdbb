// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::money::Money;

wire_enum! {
    /// Lifecycle of a parking slot.
    ///
    /// `PendingVerification` is decided once, by a platform administrator.
    /// `Rejected` is terminal. `Active` and `Inactive` toggle under owner
    /// control.
    pub enum SlotStatus {
        /// Created by its owner, awaiting administrator review.
        PendingVerification => "PENDING_VERIFICATION",
        /// Open for check-ins. Configuration is frozen.
        Active => "ACTIVE",
        /// Closed by the owner. Configuration may be edited.
        Inactive => "INACTIVE",
        /// Refused by an administrator.
        Rejected => "REJECTED",
    }
}

impl SlotStatus {
    /// Checks if a transition from this state to another is valid.
    ///
    /// Valid transitions are:
    /// - `PendingVerification` → `Active` | `Rejected`
    /// - `Active` → `Inactive`
    /// - `Inactive` → `Active`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PendingVerification, Self::Active | Self::Rejected)
                | (Self::Active, Self::Inactive)
                | (Self::Inactive, Self::Active)
        )
    }

    /// Capacity, pricing and location edits are allowed before approval and
    /// while deactivated. Rejected slots are frozen.
    #[must_use]
    pub const fn allows_config_edits(&self) -> bool {
        matches!(self, Self::PendingVerification | Self::Inactive)
    }

    /// Staff assignments may only change on a live slot.
    #[must_use]
    pub const fn allows_staff_changes(&self) -> bool {
        matches!(self, Self::Active)
    }
}

wire_enum! {
    /// Lifecycle of a parking session. Both closed states are terminal.
    pub enum SessionStatus {
        /// The vehicle is on the premises.
        CheckedIn => "CHECKED_IN",
        /// The vehicle left through the payment path.
        CheckedOut => "CHECKED_OUT",
        /// The vehicle left without paying.
        Escaped => "ESCAPED",
    }
}

impl SessionStatus {
    /// Checks if a transition from this state to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::CheckedIn, Self::CheckedOut | Self::Escaped)
        )
    }

    /// Returns whether the session has been closed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::CheckedIn)
    }
}

wire_enum! {
    /// Settlement state of a session's fee.
    pub enum PaymentStatus {
        /// Nothing collected.
        Pending => "PENDING",
        /// Something, but less than the fee.
        Partial => "PARTIAL",
        /// The fee was covered.
        Paid => "PAID",
    }
}

impl PaymentStatus {
    /// Derives the payment status from what was collected against the fee.
    ///
    /// A zero fee with zero collected counts as paid.
    #[must_use]
    pub fn for_collection(collected: Money, calculated_fee: Money) -> Self {
        if collected >= calculated_fee {
            Self::Paid
        } else if collected.is_positive() {
            Self::Partial
        } else {
            Self::Pending
        }
    }
}

wire_enum! {
    /// Lifecycle of a due.
    pub enum DueStatus {
        /// Still owed. Blocks check-ins at the owner's slots.
        Pending => "PENDING",
        /// Fully collected.
        Paid => "PAID",
        /// Forgiven by the owner.
        WrittenOff => "WRITTEN_OFF",
    }
}

impl DueStatus {
    /// Checks if a transition from this state to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Paid | Self::WrittenOff)
        )
    }
}

wire_enum! {
    /// Standing of an organization as reported by the membership directory.
    pub enum OrganizationStatus {
        /// In good standing.
        Active => "ACTIVE",
        /// Operations halted by the platform.
        Suspended => "SUSPENDED",
        /// Awaiting platform approval.
        Pending => "PENDING",
    }
}
