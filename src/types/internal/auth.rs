use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User roles recognized by the permission table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Radiologist,
    Patient,
}

impl Role {
    /// Stable string form used in the users.role column and in JWT claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Radiologist => "radiologist",
            Role::Patient => "patient",
        }
    }

    /// Static permission table mapping operations to allowed roles
    ///
    /// The role check happens before any state mutation; handlers call this
    /// first and reject with 403 on false.
    pub fn permits(&self, operation: Operation) -> bool {
        match operation {
            Operation::CreatePatient => matches!(self, Role::Admin | Role::Doctor),
            Operation::AddNote => matches!(self, Role::Doctor),
            Operation::UploadBiopsy => matches!(self, Role::Radiologist),
            // Any authenticated role may run a prediction or read the
            // dashboard; patients are additionally scoped to their own record
            // by the store.
            Operation::Predict | Operation::ViewDashboard => true,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "radiologist" => Ok(Role::Radiologist),
            "patient" => Ok(Role::Patient),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guarded operations, one per mutating or scoped endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreatePatient,
    AddNote,
    UploadBiopsy,
    Predict,
    ViewDashboard,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Display name for note attribution and dashboard headers
    pub name: String,

    /// Role string, parsed back into `Role` on extraction
    pub role: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// The authenticated identity passed explicitly into every guarded operation
///
/// Decoded from validated JWT claims at the API boundary; nothing below the
/// API layer reads ambient session state.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = claims.role.parse::<Role>()?;
        Ok(Self {
            id: claims.sub,
            name: claims.name,
            role,
        })
    }
}
