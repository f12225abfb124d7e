//! Maps a caller identity to the capabilities it holds.

use serde::{Deserialize, Serialize};

use librarycatalog_records::api::{Role, UserRecord};

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub has_patron_access: bool,
    pub has_employee_access: bool,
    pub has_manager_access: bool,
}

impl Capabilities {
    /// True if these capabilities cover everything `required` grants
    pub fn allows(&self, required: Role) -> bool {
        match required {
            Role::None => true,
            Role::Patron => self.has_patron_access,
            Role::Employee => self.has_employee_access,
            Role::Manager => self.has_manager_access,
        }
    }
}

/// Role the identity acts with, signed out callers have none
pub fn effective_role(identity: Option<&UserRecord>) -> Role {
    identity.map_or(Role::None, |user| user.role)
}

pub fn current_capabilities(identity: Option<&UserRecord>) -> Capabilities {
    let role = effective_role(identity);
    Capabilities {
        // patron access is the floor, signed out browsing included
        has_patron_access: role.max(Role::Patron).grants(Role::Patron),
        has_employee_access: role.grants(Role::Employee),
        has_manager_access: role.grants(Role::Manager),
    }
}

#[cfg(test)]
mod role_policy_tests {
    use super::*;

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: 1,
            case_id: "abc123".to_string(),
            role,
            is_restricted: false,
        }
    }

    #[test]
    fn test_signed_out_has_patron_floor_only() {
        assert_eq!(
            current_capabilities(None),
            Capabilities {
                has_patron_access: true,
                has_employee_access: false,
                has_manager_access: false,
            }
        );
    }

    #[test]
    /// Tests every role against the capability it should unlock
    fn test_role_hierarchy() {
        let cases = [
            (Role::None, true, false, false),
            (Role::Patron, true, false, false),
            (Role::Employee, true, true, false),
            (Role::Manager, true, true, true),
        ];
        for (role, patron, employee, manager) in cases {
            assert_eq!(
                current_capabilities(Some(&user(role))),
                Capabilities {
                    has_patron_access: patron,
                    has_employee_access: employee,
                    has_manager_access: manager,
                },
                "capabilities of {}",
                role
            );
        }
    }

    #[test]
    fn test_restricted_account_keeps_its_capabilities() {
        let restricted = UserRecord {
            is_restricted: true,
            ..user(Role::Employee)
        };
        assert!(current_capabilities(Some(&restricted)).has_employee_access);
    }

    #[test]
    fn test_allows() {
        let employee = current_capabilities(Some(&user(Role::Employee)));
        assert!(employee.allows(Role::Patron));
        assert!(employee.allows(Role::Employee));
        assert!(!employee.allows(Role::Manager));
    }
}
