use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Player,
    Viewer,
}

/// Registered user as stored in the `users` collection, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// Claims carried in the bearer token issued by the external identity
/// provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

/// Authenticated caller, extracted per request. Passed explicitly into
/// anything that needs to know who is acting; there is no ambient current
/// user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required"))
        }
    }

    /// Viewers are a read-only demo role: they can see everything but may
    /// not touch attendance or results.
    pub fn require_writer(&self) -> Result<()> {
        if self.role == Role::Viewer {
            Err(AppError::Forbidden("read-only account"))
        } else {
            Ok(())
        }
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            display_name: claims.name,
            role: claims.role,
        }
    }
}
