//! Realm-role parsing
//!
//! Three role patterns are recognized: the literal global-admin marker, a
//! per-orchard admin role and a per-orchard viewer role with the orchard id
//! encoded positionally in the role string. Anything else is ignored.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Realm role granting implicit admin+view over every orchard
pub const GLOBAL_ADMIN_ROLE: &str = "Orchard-Global-Admin";

static ADMIN_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Orchard-(\d+)-Admin$").expect("valid admin role pattern"));
static VIEW_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Orchard-(\d+)-View$").expect("valid view role pattern"));

/// Orchard permissions derived from realm roles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub is_global_admin: bool,
    pub admin_orchard_ids: HashSet<i64>,
    pub viewer_orchard_ids: HashSet<i64>,
}

impl RoleSet {
    /// Whether the holder can administer the given orchard.
    /// Global admins can administer any orchard.
    pub fn is_orchard_admin(&self, orchard_id: i64) -> bool {
        self.is_global_admin || self.admin_orchard_ids.contains(&orchard_id)
    }

    /// Whether the holder can view the given orchard.
    /// Global admins can view any orchard; admins can view implicitly.
    pub fn is_orchard_view(&self, orchard_id: i64) -> bool {
        self.is_global_admin
            || self.admin_orchard_ids.contains(&orchard_id)
            || self.viewer_orchard_ids.contains(&orchard_id)
    }

    /// At least one explicit per-orchard admin role
    pub fn is_any_orchard_admin(&self) -> bool {
        !self.admin_orchard_ids.is_empty()
    }

    /// At least one explicit per-orchard viewer role
    pub fn is_any_orchard_view(&self) -> bool {
        !self.viewer_orchard_ids.is_empty()
    }
}

/// Parse realm role strings into a `RoleSet`.
///
/// One pass over the claims; unmatched roles contribute nothing and
/// malformed numeric ids are skipped rather than failing the parse.
pub fn parse_realm_roles<S: AsRef<str>>(roles: &[S]) -> RoleSet {
    let mut set = RoleSet::default();

    for role in roles {
        let role = role.as_ref();
        if role == GLOBAL_ADMIN_ROLE {
            set.is_global_admin = true;
        } else if let Some(caps) = ADMIN_ROLE.captures(role) {
            if let Ok(id) = caps[1].parse::<i64>() {
                set.admin_orchard_ids.insert(id);
            }
        } else if let Some(caps) = VIEW_ROLE.captures(role) {
            if let Ok(id) = caps[1].parse::<i64>() {
                set.viewer_orchard_ids.insert(id);
            }
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_global_admin_short_circuits_everything() {
        let set = parse_realm_roles(&roles(&["Orchard-Global-Admin"]));
        assert!(set.is_global_admin);
        assert!(set.admin_orchard_ids.is_empty());
        assert!(set.viewer_orchard_ids.is_empty());
        assert!(set.is_orchard_admin(42));
        assert!(set.is_orchard_view(42));
        assert!(set.is_orchard_admin(0));
    }

    #[test]
    fn test_per_orchard_roles() {
        let set = parse_realm_roles(&roles(&["Orchard-3-Admin", "Orchard-5-View"]));
        assert!(!set.is_global_admin);
        assert_eq!(set.admin_orchard_ids, HashSet::from([3]));
        assert_eq!(set.viewer_orchard_ids, HashSet::from([5]));
        assert!(set.is_orchard_view(3)); // admin implies view
        assert!(set.is_orchard_view(5));
        assert!(!set.is_orchard_view(9));
        assert!(!set.is_orchard_admin(5));
    }

    #[test]
    fn test_admin_implies_view_for_every_admin_id() {
        let set = parse_realm_roles(&roles(&[
            "Orchard-1-Admin",
            "Orchard-2-Admin",
            "Orchard-7-Admin",
        ]));
        for id in set.admin_orchard_ids.clone() {
            assert!(set.is_orchard_view(id));
        }
    }

    #[test]
    fn test_unmatched_roles_are_ignored() {
        let set = parse_realm_roles(&roles(&[
            "offline_access",
            "uma_authorization",
            "Orchard-Admin",          // missing id
            "Orchard-3-Editor",       // unknown suffix
            "orchard-3-admin",        // wrong case
            "Orchard-3-Admin-Extra",  // trailing junk
            " Orchard-3-Admin",       // leading junk
        ]));
        assert_eq!(set, RoleSet::default());
    }

    #[test]
    fn test_malformed_numeric_id_is_skipped() {
        // An id wider than i64 parses out of range and is dropped, not fatal
        let set = parse_realm_roles(&roles(&[
            "Orchard-99999999999999999999999-Admin",
            "Orchard-4-View",
        ]));
        assert!(set.admin_orchard_ids.is_empty());
        assert_eq!(set.viewer_orchard_ids, HashSet::from([4]));
    }

    #[test]
    fn test_empty_roles() {
        let set = parse_realm_roles(&Vec::<String>::new());
        assert_eq!(set, RoleSet::default());
        assert!(!set.is_orchard_view(1));
        assert!(!set.is_any_orchard_admin());
        assert!(!set.is_any_orchard_view());
    }
}
