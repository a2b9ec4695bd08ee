//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// All roles a user may hold.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STUDENT];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
