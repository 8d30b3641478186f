//! Wallet history primitives.
//!
//! A `HistoryEntry` is an immutable snapshot appended by the same durable
//! transaction that commits a wallet mutation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents, ResultEngine, Wallet, util::parse_wallet_id};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::TransferOut => "transfer-out",
            Self::TransferIn => "transfer-in",
            Self::Delete => "delete",
        }
    }
}

impl TryFrom<&str> for Operation {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "transfer-out" => Ok(Self::TransferOut),
            "transfer-in" => Ok(Self::TransferIn),
            "delete" => Ok(Self::Delete),
            other => Err(EngineError::InvalidInput(format!(
                "invalid history operation: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub wallet_id: Uuid,
    pub owner: String,
    pub email: String,
    pub currency: Currency,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
    pub operation: Operation,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: String,
    pub owner: String,
    pub email: String,
    pub currency: String,
    pub balance: i64,
    pub operation: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Snapshot `wallet` as it is being committed.
    pub(crate) fn snapshot(wallet: &Wallet, operation: Operation) -> Self {
        Self {
            id: ActiveValue::NotSet,
            wallet_id: ActiveValue::Set(wallet.id.to_string()),
            owner: ActiveValue::Set(wallet.owner.clone()),
            email: ActiveValue::Set(wallet.email.clone()),
            currency: ActiveValue::Set(wallet.currency.code().to_string()),
            balance: ActiveValue::Set(wallet.balance.cents()),
            operation: ActiveValue::Set(operation.as_str().to_string()),
            created_at: ActiveValue::Set(wallet.updated_at),
        }
    }
}

impl TryFrom<Model> for HistoryEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            wallet_id: parse_wallet_id(&model.wallet_id)?,
            owner: model.owner,
            email: model.email,
            currency: Currency::try_from(model.currency.as_str())?,
            balance: MoneyCents::new(model.balance),
            created_at: model.created_at,
            operation: Operation::try_from(model.operation.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_tags_round_trip() {
        for op in [
            Operation::Create,
            Operation::Update,
            Operation::Deposit,
            Operation::Withdraw,
            Operation::TransferOut,
            Operation::TransferIn,
            Operation::Delete,
        ] {
            assert_eq!(Operation::try_from(op.as_str()), Ok(op));
        }
        assert!(Operation::try_from("refund").is_err());
    }

    #[test]
    fn snapshot_copies_committed_state() {
        let mut wallet = Wallet::new("Kate".to_string(), "kate@mail.com".to_string(), Currency::Rub);
        wallet.balance = MoneyCents::new(100_000);
        let entry = ActiveModel::snapshot(&wallet, Operation::Deposit);
        assert_eq!(entry.balance, ActiveValue::Set(100_000));
        assert_eq!(entry.operation, ActiveValue::Set("deposit".to_string()));
        assert_eq!(entry.created_at, ActiveValue::Set(wallet.updated_at));
    }
}
