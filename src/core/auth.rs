//! Admin role check.

use std::collections::HashSet;

/// True if any of the caller's role names is a configured admin role.
pub fn is_admin(role_names: &HashSet<String>, admin_role_names: &HashSet<String>) -> bool {
    !role_names.is_disjoint(admin_role_names)
}
