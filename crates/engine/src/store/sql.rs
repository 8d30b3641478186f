use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
    SqlErr, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    EngineError, HistoryEntry, Operation, ResultEngine, Wallet, WalletStatus, history,
    idempotency, wallets,
};

use super::{BalanceChange, HistoryParams, ListParams, WalletStore};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The rollback happens when the transaction is dropped, which also covers a
/// caller that drops the operation future mid-flight.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// [`WalletStore`] backed by SeaORM.
#[derive(Debug, Clone)]
pub struct SqlWalletStore {
    database: DatabaseConnection,
}

impl SqlWalletStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn find_active<C: ConnectionTrait>(db: &C, id: Uuid) -> ResultEngine<Option<Wallet>> {
        wallets::Entity::find_by_id(id.to_string())
            .filter(wallets::Column::Status.eq(WalletStatus::Active.as_str()))
            .one(db)
            .await?
            .map(Wallet::try_from)
            .transpose()
    }

    /// Compare-and-set write of every mutable column of `next`.
    async fn write_wallet(
        db_tx: &DatabaseTransaction,
        current: &Wallet,
        next: &Wallet,
    ) -> ResultEngine<()> {
        let res = wallets::Entity::update_many()
            .col_expr(wallets::Column::Owner, Expr::value(next.owner.clone()))
            .col_expr(wallets::Column::Email, Expr::value(next.email.clone()))
            .col_expr(wallets::Column::Currency, Expr::value(next.currency.code()))
            .col_expr(wallets::Column::Balance, Expr::value(next.balance.cents()))
            .col_expr(wallets::Column::UpdatedAt, Expr::value(next.updated_at))
            .filter(wallets::Column::Id.eq(current.id.to_string()))
            .filter(wallets::Column::Status.eq(WalletStatus::Active.as_str()))
            .filter(wallets::Column::Owner.eq(current.owner.as_str()))
            .filter(wallets::Column::Email.eq(current.email.as_str()))
            .filter(wallets::Column::Balance.eq(current.balance.cents()))
            .filter(wallets::Column::Currency.eq(current.currency.code()))
            .exec(db_tx)
            .await
            .map_err(|err| email_conflict(err, &next.email))?;

        if res.rows_affected == 0 {
            return match Self::find_active(db_tx, current.id).await? {
                Some(_) => Err(EngineError::StaleWallet(current.id.to_string())),
                None => Err(EngineError::WalletNotFound(current.id.to_string())),
            };
        }
        Ok(())
    }

    async fn append_history(
        db_tx: &DatabaseTransaction,
        wallet: &Wallet,
        operation: Operation,
    ) -> ResultEngine<()> {
        history::ActiveModel::snapshot(wallet, operation)
            .insert(db_tx)
            .await?;
        Ok(())
    }
}

/// Map a unique violation on the wallet row to `EmailNotUnique`.
fn email_conflict(err: DbErr, email: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::EmailNotUnique(email.to_string()),
        _ => EngineError::Database(err),
    }
}

/// Case-insensitive substring match over `columns`.
fn text_filter<C: ColumnTrait>(needle: Option<&str>, columns: &[C]) -> Condition {
    let Some(needle) = needle.map(str::trim).filter(|s| !s.is_empty()) else {
        return Condition::all();
    };
    let pattern = format!("%{}%", needle.to_lowercase());
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(Expr::expr(Func::lower(Expr::col(*col))).like(pattern.clone()))
    })
}

fn page<E: EntityTrait>(query: Select<E>, params: &ListParams) -> Select<E> {
    let query = query.offset(params.offset);
    if params.items_per_page > 0 {
        query.limit(params.items_per_page)
    } else {
        query
    }
}

fn direction(params: &ListParams) -> Order {
    if params.descending {
        Order::Desc
    } else {
        Order::Asc
    }
}

fn wallet_sort_column(sorting: Option<&str>) -> wallets::Column {
    match sorting.unwrap_or_default() {
        "owner" => wallets::Column::Owner,
        "email" => wallets::Column::Email,
        "currency" => wallets::Column::Currency,
        "balance" => wallets::Column::Balance,
        "updated" | "updated_at" => wallets::Column::UpdatedAt,
        _ => wallets::Column::CreatedAt,
    }
}

fn history_sort_column(sorting: Option<&str>) -> history::Column {
    match sorting.unwrap_or_default() {
        "owner" => history::Column::Owner,
        "currency" => history::Column::Currency,
        "balance" => history::Column::Balance,
        "operation" => history::Column::Operation,
        _ => history::Column::CreatedAt,
    }
}

#[async_trait]
impl WalletStore for SqlWalletStore {
    async fn create_wallet(&self, key: Uuid, wallet: &Wallet) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            idempotency::claim(&db_tx, key).await?;
            wallets::ActiveModel::from(wallet)
                .insert(&db_tx)
                .await
                .map_err(|err| email_conflict(err, &wallet.email))?;
            Self::append_history(&db_tx, wallet, Operation::Create).await?;
            Ok(wallet.clone())
        })
    }

    async fn is_claimed(&self, key: Uuid) -> ResultEngine<bool> {
        idempotency::is_claimed(&self.database, key).await
    }

    async fn get_wallet(&self, id: Uuid) -> ResultEngine<Wallet> {
        Self::find_active(&self.database, id)
            .await?
            .ok_or_else(|| EngineError::WalletNotFound(id.to_string()))
    }

    async fn get_wallets_list(&self, params: &ListParams) -> ResultEngine<Vec<Wallet>> {
        let order = direction(params);
        let query = wallets::Entity::find()
            .filter(wallets::Column::Status.eq(WalletStatus::Active.as_str()))
            .filter(text_filter(
                params.text_filter.as_deref(),
                &[wallets::Column::Owner, wallets::Column::Currency],
            ))
            .order_by(wallet_sort_column(params.sorting.as_deref()), order.clone())
            .order_by(wallets::Column::Id, order);

        page(query, params)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }

    async fn get_wallet_history(
        &self,
        id: Uuid,
        params: &HistoryParams,
    ) -> ResultEngine<Vec<HistoryEntry>> {
        let order = direction(&params.list);
        let mut query = history::Entity::find()
            .filter(history::Column::WalletId.eq(id.to_string()))
            .filter(text_filter(
                params.list.text_filter.as_deref(),
                &[
                    history::Column::Owner,
                    history::Column::Currency,
                    history::Column::Operation,
                ],
            ));
        if let Some(start) = params.period_start {
            query = query.filter(history::Column::CreatedAt.gte(start));
        }
        if let Some(end) = params.period_end {
            query = query.filter(history::Column::CreatedAt.lte(end));
        }
        let query = query
            .order_by(
                history_sort_column(params.list.sorting.as_deref()),
                order.clone(),
            )
            .order_by(history::Column::Id, order);

        page(query, &params.list)
            .all(&self.database)
            .await?
            .into_iter()
            .map(HistoryEntry::try_from)
            .collect()
    }

    async fn update_wallet(
        &self,
        key: Option<Uuid>,
        current: &Wallet,
        updated: &Wallet,
    ) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            if let Some(key) = key {
                idempotency::claim(&db_tx, key).await?;
            }
            Self::write_wallet(&db_tx, current, updated).await?;
            Self::append_history(&db_tx, updated, Operation::Update).await?;
            Ok(updated.clone())
        })
    }

    async fn delete_wallet(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let mut wallet = Self::find_active(&db_tx, id)
                .await?
                .ok_or_else(|| EngineError::WalletNotFound(id.to_string()))?;
            wallet.status = WalletStatus::Deleted;
            wallet.updated_at = Utc::now();

            let res = wallets::Entity::update_many()
                .col_expr(
                    wallets::Column::Status,
                    Expr::value(WalletStatus::Deleted.as_str()),
                )
                .col_expr(wallets::Column::UpdatedAt, Expr::value(wallet.updated_at))
                .filter(wallets::Column::Id.eq(id.to_string()))
                .filter(wallets::Column::Status.eq(WalletStatus::Active.as_str()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::WalletNotFound(id.to_string()));
            }

            Self::append_history(&db_tx, &wallet, Operation::Delete).await
        })
    }

    async fn manage_balance(&self, key: Uuid, change: &BalanceChange) -> ResultEngine<Wallet> {
        let next = change.next(Utc::now());
        with_tx!(self, |db_tx| {
            idempotency::claim(&db_tx, key).await?;
            Self::write_wallet(&db_tx, &change.current, &next).await?;
            Self::append_history(&db_tx, &next, change.operation).await?;
            Ok(next)
        })
    }

    async fn transfer_funds(
        &self,
        key: Uuid,
        src: &BalanceChange,
        dst: &BalanceChange,
    ) -> ResultEngine<Wallet> {
        let now = Utc::now();
        let src_next = src.next(now);
        let dst_next = dst.next(now);

        // Rows are always written in ascending id order.
        let mut legs = [(src, &src_next), (dst, &dst_next)];
        legs.sort_by_key(|(change, _)| change.current.id);

        with_tx!(self, |db_tx| {
            idempotency::claim(&db_tx, key).await?;
            for (change, next) in legs {
                Self::write_wallet(&db_tx, &change.current, next).await?;
            }
            Self::append_history(&db_tx, &src_next, src.operation).await?;
            Self::append_history(&db_tx, &dst_next, dst.operation).await?;
            Ok(dst_next.clone())
        })
    }
}
