//! Principal type

use serde::{Deserialize, Serialize};

use crate::utils::{AppError, ErrorCode};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

const MAX_USER_ID_LEN: usize = 128;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity-provider user id
    pub id: String,
    /// Role name (`admin` or `customer`)
    pub role: String,
}

impl CurrentUser {
    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ROLE_CUSTOMER.to_string(),
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ROLE_ADMIN.to_string(),
        }
    }

    /// Build from raw header values; a missing role means `customer`
    pub fn from_headers(id: Option<&str>, role: Option<&str>) -> Result<Self, AppError> {
        let id = id.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(AppError::not_authenticated)?;
        if id.len() > MAX_USER_ID_LEN || id.chars().any(char::is_control) {
            return Err(AppError::with_message(
                ErrorCode::InvalidIdentity,
                "Malformed user id header",
            ));
        }
        let role = match role.map(|r| r.trim().to_ascii_lowercase()) {
            None => ROLE_CUSTOMER.to_string(),
            Some(r) if r.is_empty() => ROLE_CUSTOMER.to_string(),
            Some(r) if r == ROLE_ADMIN || r == ROLE_CUSTOMER => r,
            Some(r) => {
                return Err(AppError::with_message(
                    ErrorCode::InvalidIdentity,
                    format!("Unknown role: {r}"),
                ));
            }
        };
        Ok(Self {
            id: id.to_string(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Whether the caller may act on a resource owned by `owner_id`
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.is_admin() || self.id == owner_id
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::admin_required())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers() {
        let user = CurrentUser::from_headers(Some(" u-1 "), None).unwrap();
        assert_eq!(user.id, "u-1");
        assert!(!user.is_admin());

        let admin = CurrentUser::from_headers(Some("ops"), Some("Admin")).unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn test_from_headers_rejects_bad_identity() {
        let err = CurrentUser::from_headers(None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err = CurrentUser::from_headers(Some("u1"), Some("root")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentity);

        let long = "x".repeat(MAX_USER_ID_LEN + 1);
        let err = CurrentUser::from_headers(Some(&long), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentity);
    }

    #[test]
    fn test_access_rules() {
        let user = CurrentUser::customer("u1");
        assert!(user.can_access("u1"));
        assert!(!user.can_access("u2"));
        assert!(CurrentUser::admin("a").can_access("u2"));
        assert_eq!(
            user.ensure_admin().unwrap_err().code,
            ErrorCode::AdminRequired
        );
    }
}
