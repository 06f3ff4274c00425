use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
///
/// Role checks beyond "a valid role is present" are the surrounding
/// application's concern; the ledger itself never consults them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }
}
