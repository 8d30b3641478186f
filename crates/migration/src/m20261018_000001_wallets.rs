//! Ledger schema.
//!
//! - `wallets`: one row per wallet, soft deleted through `status`
//! - `wallet_history`: append-only snapshots of committed wallet states
//! - `idempotency_keys`: transaction keys already claimed by a mutation

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Owner,
    Email,
    Currency,
    Balance,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WalletHistory {
    Table,
    Id,
    WalletId,
    Owner,
    Email,
    Currency,
    Balance,
    Operation,
    CreatedAt,
}

#[derive(Iden)]
enum IdempotencyKeys {
    Table,
    Id,
    TransactionKey,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Wallets::Owner).string().not_null())
                    .col(ColumnDef::new(Wallets::Email).string().not_null())
                    .col(ColumnDef::new(Wallets::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Wallets::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Wallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Deleted wallets keep their email reserved.
        manager
            .create_index(
                Index::create()
                    .name("uidx-wallets-email")
                    .table(Wallets::Table)
                    .col(Wallets::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WalletHistory::WalletId).string().not_null())
                    .col(ColumnDef::new(WalletHistory::Owner).string().not_null())
                    .col(ColumnDef::new(WalletHistory::Email).string().not_null())
                    .col(ColumnDef::new(WalletHistory::Currency).string().not_null())
                    .col(
                        ColumnDef::new(WalletHistory::Balance)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletHistory::Operation).string().not_null())
                    .col(
                        ColumnDef::new(WalletHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_history-wallet_id")
                            .from(WalletHistory::Table, WalletHistory::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_history-wallet_id-created_at")
                    .table(WalletHistory::Table)
                    .col(WalletHistory::WalletId)
                    .col(WalletHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IdempotencyKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdempotencyKeys::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdempotencyKeys::TransactionKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdempotencyKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-idempotency_keys-transaction_key")
                    .table(IdempotencyKeys::Table)
                    .col(IdempotencyKeys::TransactionKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdempotencyKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;

        Ok(())
    }
}
