use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::page::PageItem;
use crate::ids::{AccountId, TransactionId};

/// A posted or pending transaction on a linked account.
///
/// Amounts are in minor units (cents); negative values are outflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub posted_at: NaiveDate,
    #[serde(default)]
    pub pending: bool,
}

impl Transaction {
    pub fn is_outflow(&self) -> bool {
        self.amount_minor < 0
    }
}

impl PageItem for Transaction {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }
}
