//! # Access Control
//!
//! Staff roles, the capabilities routes require, and the matrix joining them.
//!
//! ## Permission Matrix
//! ```text
//! ┌──────────────────┬─────────┬──────────┬───────────┐
//! │ Capability       │  admin  │ cashier  │ inventory │
//! ├──────────────────┼─────────┼──────────┼───────────┤
//! │ ViewDashboard    │    ✓    │    ✓     │     ✓     │
//! │ ViewCatalog      │    ✓    │    ✓     │     ✓     │
//! │ OperatePos       │    ✓    │    ✓     │           │
//! │ ViewSales        │    ✓    │    ✓     │           │
//! │ ManageCustomers  │    ✓    │    ✓     │           │
//! │ ManageProducts   │    ✓    │          │     ✓     │
//! │ ManageInventory  │    ✓    │          │     ✓     │
//! │ VoidSales        │    ✓    │          │           │
//! │ ManageUsers      │    ✓    │          │           │
//! │ ManageSettings   │    ✓    │          │           │
//! └──────────────────┴─────────┴──────────┴───────────┘
//! ```
//!
//! The matrix is built once at startup and never mutated. Route groups name
//! the capability they need; nothing compares role names directly.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Cashier,
    Inventory,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Cashier, Role::Inventory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "cashier" => Ok(Role::Cashier),
            "inventory" => Ok(Role::Inventory),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Capability
// =============================================================================

/// Something a route can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ViewCatalog,
    /// Cart and checkout.
    OperatePos,
    ViewSales,
    VoidSales,
    ManageProducts,
    /// Stock adjustments, movements, inventory report.
    ManageInventory,
    ManageCustomers,
    ManageUsers,
    ManageSettings,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::ViewDashboard,
        Capability::ViewCatalog,
        Capability::OperatePos,
        Capability::ViewSales,
        Capability::VoidSales,
        Capability::ManageProducts,
        Capability::ManageInventory,
        Capability::ManageCustomers,
        Capability::ManageUsers,
        Capability::ManageSettings,
    ];
}

const CASHIER_CAPABILITIES: &[Capability] = &[
    Capability::ViewDashboard,
    Capability::ViewCatalog,
    Capability::OperatePos,
    Capability::ViewSales,
    Capability::ManageCustomers,
];

const INVENTORY_CAPABILITIES: &[Capability] = &[
    Capability::ViewDashboard,
    Capability::ViewCatalog,
    Capability::ManageProducts,
    Capability::ManageInventory,
];

// =============================================================================
// Permission Matrix
// =============================================================================

/// Capability set per role.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    grants: HashMap<Role, HashSet<Capability>>,
}

impl PermissionMatrix {
    /// The store's fixed matrix. Admin holds every capability.
    pub fn standard() -> Self {
        let mut grants = HashMap::new();
        grants.insert(Role::Admin, Capability::ALL.into_iter().collect());
        grants.insert(Role::Cashier, CASHIER_CAPABILITIES.iter().copied().collect());
        grants.insert(
            Role::Inventory,
            INVENTORY_CAPABILITIES.iter().copied().collect(),
        );
        PermissionMatrix { grants }
    }

    pub fn allows(&self, role: Role, capability: Capability) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|caps| caps.contains(&capability))
    }

    /// Sorted capability list for a role.
    pub fn capabilities(&self, role: Role) -> Vec<Capability> {
        let mut caps: Vec<Capability> = self
            .grants
            .get(&role)
            .map(|caps| caps.iter().copied().collect())
            .unwrap_or_default();
        caps.sort();
        caps
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        PermissionMatrix::standard()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_is_superset_of_other_roles() {
        let matrix = PermissionMatrix::standard();
        for role in [Role::Cashier, Role::Inventory] {
            for cap in matrix.capabilities(role) {
                assert!(matrix.allows(Role::Admin, cap), "admin lacks {cap:?}");
            }
        }
        assert_eq!(matrix.capabilities(Role::Admin).len(), Capability::ALL.len());
    }

    #[test]
    fn test_cashier_runs_till_but_not_stock() {
        let matrix = PermissionMatrix::standard();
        assert!(matrix.allows(Role::Cashier, Capability::OperatePos));
        assert!(matrix.allows(Role::Cashier, Capability::ViewSales));
        assert!(!matrix.allows(Role::Cashier, Capability::ManageInventory));
        assert!(!matrix.allows(Role::Cashier, Capability::VoidSales));
        assert!(!matrix.allows(Role::Cashier, Capability::ManageUsers));
    }

    #[test]
    fn test_inventory_manages_stock_but_not_till() {
        let matrix = PermissionMatrix::standard();
        assert!(matrix.allows(Role::Inventory, Capability::ManageProducts));
        assert!(matrix.allows(Role::Inventory, Capability::ManageInventory));
        assert!(!matrix.allows(Role::Inventory, Capability::OperatePos));
        assert!(!matrix.allows(Role::Inventory, Capability::ManageSettings));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" cashier ".parse::<Role>().unwrap(), Role::Cashier);
        assert!("manager".parse::<Role>().is_err());
    }
}
