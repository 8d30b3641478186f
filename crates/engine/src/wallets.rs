//! The module contains `Wallet` struct and its persisted model.

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents, ResultEngine, util::parse_wallet_id};

/// Lifecycle state of a wallet.
///
/// `Deleted` is terminal: the row is kept for history lineage but every
/// lookup treats it as missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalletStatus {
    #[default]
    Active,
    Deleted,
}

impl WalletStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl TryFrom<&str> for WalletStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            other => Err(EngineError::InvalidInput(format!(
                "invalid wallet status: {other}"
            ))),
        }
    }
}

/// A wallet.
///
/// The unit of custody: one owner, one currency, one balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    /// Stable identifier, generated once at creation.
    pub id: Uuid,
    pub owner: String,
    pub email: String,
    pub currency: Currency,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: WalletStatus,
}

impl Wallet {
    pub fn new(owner: String, email: String, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            email,
            currency,
            balance: MoneyCents::ZERO,
            created_at: now,
            updated_at: now,
            status: WalletStatus::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    #[sea_orm(unique)]
    pub email: String,
    pub currency: String,
    pub balance: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::history::Entity")]
    History,
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner: ActiveValue::Set(value.owner.clone()),
            email: ActiveValue::Set(value.email.clone()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            balance: ActiveValue::Set(value.balance.cents()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_wallet_id(&model.id)?,
            owner: model.owner,
            email: model.email,
            currency: Currency::try_from(model.currency.as_str())?,
            balance: MoneyCents::new(model.balance),
            created_at: model.created_at,
            updated_at: model.updated_at,
            status: WalletStatus::try_from(model.status.as_str())?,
        })
    }
}
