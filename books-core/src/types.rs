//! Core types for the bookkeeping domain
//!
//! Records mirror the rows served by the remote data provider:
//! - Delegations belong to an organization
//! - Accounts and transactions belong to a delegation
//! - Categories belong to an organization and carry an explicit sort order

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get as string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Tenant that owns delegations and categories
    OrganizationId
);
string_id!(
    /// Delegation (branch/office) that owns accounts and transactions
    DelegationId
);
string_id!(
    /// Account identifier
    AccountId
);
string_id!(
    /// Category identifier
    CategoryId
);
string_id!(
    /// Transaction (movement) identifier
    TransactionId
);

/// Delegation within an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    /// Delegation ID
    pub id: DelegationId,

    /// Owning organization
    pub organization_id: OrganizationId,

    /// Display name
    pub name: String,
}

/// Kind of money container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Physical cash box
    #[serde(alias = "cash-box", alias = "cash")]
    CashBox,
    /// Bank account
    Bank,
}

impl AccountKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::CashBox => "cash_box",
            AccountKind::Bank => "bank",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon shown next to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountIcon {
    /// Cash box icon
    CashBox,
    /// Bank icon
    Bank,
}

impl AccountIcon {
    /// Symbol rendered by the presentation layer
    pub fn symbol(&self) -> &'static str {
        match self {
            AccountIcon::CashBox => "💵",
            AccountIcon::Bank => "🏦",
        }
    }
}

impl fmt::Display for AccountIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Account owned by a delegation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: AccountId,

    /// Owning delegation
    pub delegation_id: DelegationId,

    /// Display name
    pub name: String,

    /// Cash box or bank
    pub kind: AccountKind,

    /// Bank name, only meaningful for bank accounts
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl Account {
    /// Create a cash box account with a fresh ID
    pub fn cash_box(delegation_id: DelegationId, name: impl Into<String>) -> Self {
        Self {
            id: AccountId::generate(),
            delegation_id,
            name: name.into(),
            kind: AccountKind::CashBox,
            bank_name: None,
        }
    }

    /// Create a bank account with a fresh ID
    pub fn bank(
        delegation_id: DelegationId,
        name: impl Into<String>,
        bank_name: impl Into<String>,
    ) -> Self {
        Self {
            id: AccountId::generate(),
            delegation_id,
            name: name.into(),
            kind: AccountKind::Bank,
            bank_name: Some(bank_name.into()),
        }
    }

    /// Name shown in listings: "{bank} - {name}" for bank accounts, "{name}" otherwise
    pub fn display_name(&self) -> String {
        match (self.kind, self.bank_name.as_deref()) {
            (AccountKind::Bank, Some(bank)) if !bank.is_empty() => {
                format!("{} - {}", bank, self.name)
            }
            _ => self.name.clone(),
        }
    }

    /// Icon for the account kind
    pub fn icon(&self) -> AccountIcon {
        match self.kind {
            AccountKind::CashBox => AccountIcon::CashBox,
            AccountKind::Bank => AccountIcon::Bank,
        }
    }
}

/// Transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID
    pub id: CategoryId,

    /// Owning organization
    pub organization_id: OrganizationId,

    /// Display name
    pub name: String,

    /// Listing position (ascending, gaps allowed)
    pub sort_order: i32,
}

/// Stable sort of categories by `sort_order`
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by_key(|c| c.sort_order);
}

/// Money movement on an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: TransactionId,

    /// Signed amount: positive = inflow, negative = outflow
    pub amount: Decimal,

    /// Account the money moved on
    pub account_id: AccountId,

    /// Category assigned to the movement
    pub category_id: CategoryId,

    /// Provider-defined fields (date, description, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// Create a transaction with a fresh ID and no extra fields
    pub fn new(amount: Decimal, account_id: AccountId, category_id: CategoryId) -> Self {
        Self {
            id: TransactionId::generate(),
            amount,
            account_id,
            category_id,
            extra: serde_json::Map::new(),
        }
    }

    /// Money coming in
    pub fn is_inflow(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Money going out
    pub fn is_outflow(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delegation() -> DelegationId {
        DelegationId::new("del-1")
    }

    #[test]
    fn test_bank_display_name() {
        let account = Account::bank(delegation(), "Main", "Acme");
        assert_eq!(account.display_name(), "Acme - Main");
        assert_eq!(account.icon(), AccountIcon::Bank);
    }

    #[test]
    fn test_cash_box_ignores_bank_name() {
        let mut account = Account::cash_box(delegation(), "Petty Cash");
        account.bank_name = Some("Acme".to_string());
        assert_eq!(account.display_name(), "Petty Cash");
        assert_eq!(account.icon(), AccountIcon::CashBox);
    }

    #[test]
    fn test_bank_without_bank_name() {
        let mut account = Account::bank(delegation(), "Main", "");
        assert_eq!(account.display_name(), "Main");
        account.bank_name = None;
        assert_eq!(account.display_name(), "Main");
    }

    #[test]
    fn test_icons_differ() {
        assert_ne!(AccountIcon::Bank.symbol(), AccountIcon::CashBox.symbol());
    }

    #[test]
    fn test_sort_categories_stable() {
        let org = OrganizationId::new("org-1");
        let mk = |id: &str, order| Category {
            id: CategoryId::new(id),
            organization_id: org.clone(),
            name: id.to_string(),
            sort_order: order,
        };
        let mut categories = vec![mk("c", 3), mk("a", 1), mk("b1", 2), mk("b2", 2)];
        sort_categories(&mut categories);

        let ids: Vec<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_inflow_outflow() {
        let tx = Transaction::new(Decimal::new(-500, 2), AccountId::new("a"), CategoryId::new("c"));
        assert!(tx.is_outflow());
        assert!(!tx.is_inflow());

        let zero = Transaction::new(Decimal::ZERO, AccountId::new("a"), CategoryId::new("c"));
        assert!(!zero.is_inflow());
        assert!(!zero.is_outflow());
    }
}
