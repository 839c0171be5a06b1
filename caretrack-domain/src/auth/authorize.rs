//! Role-based access checks.

use thiserror::Error;
use tracing::warn;

use super::UserInfo;

/// Raised when the caller lacks every required role
#[derive(Debug, Error)]
#[error("Not authorized: requires one of roles {required:?}")]
pub struct RoleError {
    /// Roles that would have granted access
    pub required: Vec<String>,
}

/// Require that the caller holds at least one of the given roles
pub fn ensure_any_role(user: &UserInfo, required: &[&str]) -> Result<(), RoleError> {
    if required.iter().any(|role| user.roles.iter().any(|r| r == role)) {
        return Ok(());
    }

    warn!(
        "User {} lacks required roles {:?} (has {:?})",
        user.user_id, required, user.roles
    );
    Err(RoleError {
        required: required.iter().map(|r| r.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> UserInfo {
        UserInfo {
            user_id: "test-user".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_matching_role_passes() {
        assert!(ensure_any_role(&user(&["admin", "user"]), &["admin"]).is_ok());
    }

    #[test]
    fn test_any_of_several_roles_passes() {
        assert!(
            ensure_any_role(&user(&["healthcare_professional"]), &["healthcare_professional", "admin"]).is_ok()
        );
    }

    #[test]
    fn test_no_matching_role_fails() {
        let result = ensure_any_role(&user(&["user"]), &["admin"]);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().required, vec!["admin".to_string()]);
    }
}
