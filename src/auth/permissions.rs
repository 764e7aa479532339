use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Application modules a user can be granted access to
pub const MODULES: [&str; 9] = [
    "dashboard",
    "payments",
    "clients",
    "calendar",
    "products",
    "products_list",
    "invoice",
    "quotes",
    "profiles",
];

/// Granted to every newly registered non-admin account
pub const DEFAULT_PERMISSION: &str = "dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Stored role text. Anything unrecognized is treated as an ordinary user.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(role = value, "Unknown stored role, treating as user");
            Role::User
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Set of module permissions, persisted as comma-separated text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn parse(stored: &str) -> Self {
        stored
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn all_modules() -> Self {
        MODULES.iter().copied().collect()
    }

    pub fn default_for(role: Role) -> Self {
        match role {
            Role::Admin => Self::all_modules(),
            Role::User => [DEFAULT_PERMISSION].into_iter().collect(),
        }
    }

    pub fn to_stored(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Whether `permission` is held, treating `products` and `products_list` as one
    pub fn grants(&self, permission: &str) -> bool {
        if self.0.contains(permission) {
            return true;
        }
        match permission {
            "products" => self.0.contains("products_list"),
            "products_list" => self.0.contains("products"),
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_ignores_blanks_and_whitespace() {
        let set = PermissionSet::parse(" dashboard, ,clients,,calendar ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["calendar", "clients", "dashboard"]);
        assert_eq!(set.to_stored(), "calendar,clients,dashboard");
        assert!(PermissionSet::parse("").is_empty());
    }

    #[rstest]
    #[case("products", "products_list", true)]
    #[case("products_list", "products", true)]
    #[case("products", "products", true)]
    #[case("clients", "invoice", false)]
    #[case("dashboard", "dashboardx", false)]
    fn grants_handles_product_aliases(#[case] held: &str, #[case] asked: &str, #[case] expected: bool) {
        let set = PermissionSet::parse(held);
        assert_eq!(set.grants(asked), expected);
    }

    #[test]
    fn defaults_per_role() {
        assert_eq!(PermissionSet::default_for(Role::User).to_stored(), "dashboard");
        assert_eq!(PermissionSet::default_for(Role::Admin).len(), MODULES.len());
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case(" Admin ", Role::Admin)]
    #[case("user", Role::User)]
    #[case("superuser", Role::User)]
    fn stored_roles_fall_back_to_user(#[case] stored: &str, #[case] expected: Role) {
        assert_eq!(Role::from_stored(stored), expected);
    }
}
