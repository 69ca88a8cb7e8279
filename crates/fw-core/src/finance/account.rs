use serde::{Deserialize, Serialize};

use super::page::PageItem;
use crate::ids::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Depository,
    Credit,
    Loan,
    Investment,
    #[serde(other)]
    Other,
}

/// A bank account linked through the link flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    /// Last digits of the account number.
    #[serde(default)]
    pub mask: Option<String>,
    pub kind: AccountKind,
    #[serde(default)]
    pub current_balance_minor: Option<i64>,
    #[serde(default)]
    pub available_balance_minor: Option<i64>,
    pub currency: String,
    #[serde(default)]
    pub institution_name: Option<String>,
}

impl Account {
    pub fn display_name(&self) -> String {
        match &self.mask {
            Some(mask) => format!("{} ••{}", self.name, mask),
            None => self.name.clone(),
        }
    }
}

impl PageItem for Account {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }
}
