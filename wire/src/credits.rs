//! Credits ledger records for `/credits/*`.
//!
//! The client never computes balances. It displays what these records carry and
//! patches `CreditBalance::balance` from a [`PurchaseResponse`].

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub balance: i64,
    #[serde(default)]
    pub total_purchased: i64,
    #[serde(default)]
    pub total_spent: i64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Spend,
    Refund,
    Bonus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: String,
    /// Signed amount: spends are negative.
    pub amount: i64,
    #[serde(rename = "type", alias = "kind")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub balance_after: Option<i64>,
}

/// Paged response of `GET /credits/transactions`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<CreditTransaction>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditPackage {
    pub id: String,
    pub name: String,
    pub credits: i64,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub bonus_credits: Option<i64>,
    #[serde(default)]
    pub is_popular: bool,
}

fn default_currency() -> String {
    "USD".to_owned()
}

impl CreditPackage {
    /// Credits granted including any bonus.
    #[must_use]
    pub fn total_credits(&self) -> i64 {
        self.credits + self.bonus_credits.unwrap_or(0)
    }
}

/// Price of one billable action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCost {
    pub action_type: String,
    pub cost: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of `POST /credits/packages/{id}/purchase`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    #[serde(default)]
    pub success: bool,
    pub new_balance: i64,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /credits/check-action/{type}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCheck {
    #[serde(default)]
    pub action_type: String,
    pub can_perform: bool,
    #[serde(default)]
    pub required_credits: i64,
    #[serde(default)]
    pub current_balance: i64,
}
