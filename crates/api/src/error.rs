// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use parkledger::CoreError;
use parkledger_domain::DomainError;
use parkledger_persistence::PersistenceError;
use tracing::error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no usable identity.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor holds no role on the resource.
    NotAuthorized {
        /// The action that was attempted.
        action: String,
    },
    /// The actor holds a role, but not a strong enough one.
    InsufficientRole {
        /// The action that was attempted.
        action: String,
        /// The access level required for this action.
        required_role: String,
        /// The role the actor actually holds.
        actual_role: String,
    },
    /// The action is reserved for platform administrators.
    PlatformAdminRequired {
        /// The action that was attempted.
        action: String,
    },
    /// The slot's organization is suspended.
    OrganizationSuspended {
        /// The action that was attempted.
        action: String,
        /// The suspended organization.
        organization_id: i64,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::NotAuthorized { action } => {
                write!(f, "Not authorized: no role permits '{action}'")
            }
            Self::InsufficientRole {
                action,
                required_role,
                actual_role,
            } => write!(
                f,
                "Insufficient role: '{action}' requires {required_role}, actor holds {actual_role}"
            ),
            Self::PlatformAdminRequired { action } => {
                write!(f, "Not authorized: '{action}' requires a platform administrator")
            }
            Self::OrganizationSuspended {
                action,
                organization_id,
            } => write!(
                f,
                "Organization {organization_id} is suspended; '{action}' is not permitted"
            ),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract. Every variant maps to one stable code through
/// [`ApiError::code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor may not perform the action at all.
    NotAuthorized {
        /// `NOT_AUTHORIZED` or `ORG_SUSPENDED`.
        code: &'static str,
        /// The action that was attempted.
        action: String,
        /// A human-readable description.
        message: String,
    },
    /// The actor holds a role that is too weak for the action.
    InsufficientRole {
        /// The action that was attempted.
        action: String,
        /// The access level required for this action.
        required_role: String,
        /// The role the actor actually holds.
        actual_role: String,
    },
    /// A ledger rule was violated.
    DomainRuleViolation {
        /// The stable code of the violated rule.
        code: &'static str,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The stable code for the validation failure.
        code: &'static str,
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The stable code, e.g. `SLOT_NOT_FOUND`.
        code: &'static str,
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred. The transaction was rolled back.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            Self::NotAuthorized { code, .. }
            | Self::DomainRuleViolation { code, .. }
            | Self::InvalidInput { code, .. }
            | Self::ResourceNotFound { code, .. } => *code,
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for a missing slot.
    #[must_use]
    pub fn slot_not_found(slot_id: i64) -> Self {
        Self::ResourceNotFound {
            code: "SLOT_NOT_FOUND",
            resource_type: String::from("Slot"),
            message: format!("Slot {slot_id} does not exist"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::NotAuthorized { message, .. } => write!(f, "{message}"),
            Self::InsufficientRole {
                action,
                required_role,
                actual_role,
            } => write!(
                f,
                "Insufficient role: '{action}' requires {required_role}, actor holds {actual_role}"
            ),
            Self::DomainRuleViolation { code, message } => {
                write!(f, "Domain rule violation ({code}): {message}")
            }
            Self::InvalidInput { field, message, .. } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
                ..
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message: String = err.to_string();
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::NotAuthorized { action } | AuthError::PlatformAdminRequired { action } => {
                Self::NotAuthorized {
                    code: "NOT_AUTHORIZED",
                    action,
                    message,
                }
            }
            AuthError::InsufficientRole {
                action,
                required_role,
                actual_role,
            } => Self::InsufficientRole {
                action,
                required_role,
                actual_role,
            },
            AuthError::OrganizationSuspended { action, .. } => Self::NotAuthorized {
                code: "ORG_SUSPENDED",
                action,
                message,
            },
        }
    }
}

/// Store failures inside an operation are never the caller's fault; the
/// transaction rolls back and the failure surfaces as internal.
impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        if matches!(err, PersistenceError::InvariantViolation(_)) {
            error!(error = %err, "Ledger invariant rejected by the store");
        }
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let code: &'static str = err.code();
    if err.is_internal() {
        error!(error = %err, "Internal ledger fault");
        return ApiError::Internal {
            message: err.to_string(),
        };
    }

    match err {
        DomainError::InvalidVehicleNumber(_) => ApiError::InvalidInput {
            code,
            field: String::from("vehicle_number"),
            message: err.to_string(),
        },
        DomainError::InvalidInput { field, message } => ApiError::InvalidInput {
            code,
            field: field.to_string(),
            message,
        },
        DomainError::MissingPricingConfig { .. }
        | DomainError::IncompletePricingConfig { .. }
        | DomainError::InvalidPricingConfig(_) => ApiError::InvalidInput {
            code,
            field: String::from("pricing_config"),
            message: err.to_string(),
        },
        DomainError::SessionNotFound(_) => ApiError::ResourceNotFound {
            code,
            resource_type: String::from("Session"),
            message: err.to_string(),
        },
        DomainError::DueNotFound(_) => ApiError::ResourceNotFound {
            code,
            resource_type: String::from("Due"),
            message: err.to_string(),
        },
        DomainError::StaffNotFound(_) => ApiError::ResourceNotFound {
            code,
            resource_type: String::from("Staff assignment"),
            message: err.to_string(),
        },
        other => ApiError::DomainRuleViolation {
            code,
            message: other.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}
