//! Ledger transactions.
//!
//! A `Transaction` is a dated, signed movement owned by one user. Positive
//! amounts are income, negative amounts are expenses. The category is the raw
//! label typed by the user and is only resolved at read time.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::normalize_category_key};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: i64,
    pub occurred_on: NaiveDate,
    pub amount: MoneyCents,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub description: Option<String>,
    /// Set for imported rows; a second row with the same key for the same
    /// user is skipped by batch inserts.
    pub import_key: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Transaction {
    pub fn new(
        user_id: i64,
        occurred_on: NaiveDate,
        amount: MoneyCents,
        category: Option<String>,
    ) -> ResultEngine<Self> {
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount(
                "amount must not be zero".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            occurred_on,
            amount,
            category: non_blank(category),
            merchant: None,
            description: None,
            import_key: None,
        })
    }

    pub fn with_details(mut self, merchant: Option<String>, description: Option<String>) -> Self {
        self.merchant = non_blank(merchant);
        self.description = non_blank(description);
        self
    }

    /// Marks the transaction as imported, keyed by [`Transaction::fingerprint`].
    pub fn imported(mut self) -> Self {
        self.import_key = Some(self.fingerprint());
        self
    }

    /// Hex sha256 of the row content. Merchant and category compare
    /// case-insensitively; the id is not part of it.
    pub fn fingerprint(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}|{}",
            self.user_id,
            self.occurred_on.format("%Y-%m-%d"),
            self.amount.cents(),
            self.merchant.as_deref().and_then(normalize_category_key).unwrap_or_default(),
            self.category.as_deref().and_then(normalize_category_key).unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
        );
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i64,
    pub occurred_on: Date,
    pub amount_minor: i64,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub import_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.clone()),
            merchant: ActiveValue::Set(tx.merchant.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            import_key: ActiveValue::Set(tx.import_key.clone()),
        }
    }
}
