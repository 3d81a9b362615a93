//! Catalog of assignable user roles.

use std::collections::HashSet;

use crate::domain::error::DomainError;

/// A role an administrator may assign to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleDefinition {
    pub role: String,
}

#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: Vec<UserRoleDefinition>,
}

impl RoleCatalog {
    /// Build a catalog, rejecting blank and duplicate role labels.
    pub fn new(roles: Vec<UserRoleDefinition>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for definition in &roles {
            if definition.role.trim().is_empty() {
                return Err(DomainError::validation("role label must not be empty"));
            }
            if !seen.insert(definition.role.as_str()) {
                return Err(DomainError::validation(format!(
                    "role `{}` is defined more than once",
                    definition.role
                )));
            }
        }
        Ok(Self { roles })
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|definition| definition.role == role)
    }
}
