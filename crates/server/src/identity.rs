// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity extraction for the server.
//!
//! Authentication happens upstream. The gateway in front of the ledger
//! forwards the verified identity in request headers, and this module turns
//! those headers into an [`AuthenticatedActor`] plus the [`Cause`] recorded
//! on every audit event the request produces.
//!
//! | Header               | Required | Meaning                                |
//! |----------------------|----------|----------------------------------------|
//! | `X-Actor-Id`         | yes      | The verified actor identifier          |
//! | `X-Actor-Role`       | no       | `admin` or `member` (default `member`) |
//! | `X-Request-Id`       | no       | Cause id for the audit trail           |
//! | `X-Cause-Description`| no       | Cause description for the audit trail  |

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use parkledger_api::{AuthenticatedActor, Role};
use parkledger_audit::Cause;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Header carrying the verified actor identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the actor's platform role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the request id used as the audit cause id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying a free-form audit cause description.
pub const CAUSE_DESCRIPTION_HEADER: &str = "x-cause-description";

/// Extractor for the verified caller of a request.
///
/// ```ignore
/// async fn my_handler(
///     RequestActor(actor, cause): RequestActor,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // cause: Cause
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 when the actor header is missing, blank or not
/// valid UTF-8, or when the role header names an unknown role.
pub struct RequestActor(pub AuthenticatedActor, pub Cause);

impl FromRequestParts<AppState> for RequestActor {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id: &str = header_value(&parts.headers, ACTOR_ID_HEADER)?.ok_or_else(|| {
            debug!("Missing actor header");
            IdentityError::MissingActor
        })?;

        let role: Role = match header_value(&parts.headers, ACTOR_ROLE_HEADER)? {
            None => Role::Member,
            Some(raw) => parse_role(raw)?,
        };

        let actor: AuthenticatedActor = AuthenticatedActor::new(actor_id, role).map_err(|e| {
            warn!(error = %e, "Rejected actor identity");
            IdentityError::InvalidActor(e.to_string())
        })?;

        let cause_id: String = header_value(&parts.headers, REQUEST_ID_HEADER)?
            .map_or_else(|| String::from("unassigned"), String::from);
        let description: String = header_value(&parts.headers, CAUSE_DESCRIPTION_HEADER)?
            .map_or_else(
                || format!("{} {}", parts.method, parts.uri.path()),
                String::from,
            );

        debug!(actor_id = %actor.id, role = ?actor.role, "Resolved request actor");

        Ok(Self(actor, Cause::new(cause_id, description)))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, IdentityError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                warn!(header = name, "Header is not valid UTF-8");
                IdentityError::InvalidHeader(name.to_string())
            })
        })
        .transpose()
}

fn parse_role(raw: &str) -> Result<Role, IdentityError> {
    match raw.trim().to_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "member" => Ok(Role::Member),
        _ => {
            warn!(role = raw, "Unknown actor role");
            Err(IdentityError::InvalidRole(raw.to_string()))
        }
    }
}

/// Identity extraction errors.
///
/// All of them surface as `AUTHENTICATION_FAILED`.
#[derive(Debug)]
pub enum IdentityError {
    /// The actor header is missing.
    MissingActor,
    /// A header is not valid UTF-8.
    InvalidHeader(String),
    /// The actor identity was rejected.
    InvalidActor(String),
    /// The role header names an unknown role.
    InvalidRole(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingActor => String::from("Missing X-Actor-Id header"),
            Self::InvalidHeader(name) => format!("Header '{name}' is not valid UTF-8"),
            Self::InvalidActor(reason) => reason,
            Self::InvalidRole(role) => {
                format!("Invalid role: '{role}'. Must be 'admin' or 'member'")
            }
        };

        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: String::from("AUTHENTICATION_FAILED"),
            message,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
