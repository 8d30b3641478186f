//! Idempotency guard.
//!
//! A transaction key is claimed by inserting it into `idempotency_keys`, whose
//! unique index makes a second insert fail. The insert runs on the caller's
//! open transaction so the claim commits or rolls back together with the
//! mutation it protects.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, SqlErr, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "idempotency_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub transaction_key: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Record `key` on `db`.
///
/// Fails with [`EngineError::AlreadyClaimed`] if the key was committed before,
/// any other failure is returned as a database error.
pub(crate) async fn claim<C: ConnectionTrait>(db: &C, key: Uuid) -> ResultEngine<()> {
    let record = ActiveModel {
        id: ActiveValue::NotSet,
        transaction_key: ActiveValue::Set(key.to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    };

    match Entity::insert(record).exec_without_returning(db).await {
        Ok(_) => Ok(()),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::info!(%key, "transaction key replayed");
                Err(EngineError::AlreadyClaimed(key.to_string()))
            }
            _ => Err(EngineError::Database(err)),
        },
    }
}

/// Whether `key` has already been committed.
pub(crate) async fn is_claimed<C: ConnectionTrait>(db: &C, key: Uuid) -> ResultEngine<bool> {
    let found = Entity::find()
        .filter(Column::TransactionKey.eq(key.to_string()))
        .one(db)
        .await?;
    Ok(found.is_some())
}
