use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 50).unique_key())
                    .col(string_null(Users::Email).unique_key())
                    .col(string_null(Users::Phone))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string(Users::PasswordHash))
                    .col(string_len_null(Users::FinnhubApiKey, 100).unique_key())
                    .col(boolean(Users::IsActive).default(true))
                    .col(boolean(Users::IsStaff).default(false))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .col(timestamp_with_time_zone_null(Users::LastLogin))
                    .to_owned(),
            )
            .await?;

        // Create supported_exchanges table
        manager
            .create_table(
                Table::create()
                    .table(SupportedExchanges::Table)
                    .if_not_exists()
                    .col(pk_auto(SupportedExchanges::Id))
                    .col(string_len(SupportedExchanges::Code, 4).unique_key())
                    .col(string_len(SupportedExchanges::Name, 100))
                    .col(string_len_null(SupportedExchanges::Timezone, 100))
                    .col(string_len_null(SupportedExchanges::Country, 100))
                    .to_owned(),
            )
            .await?;

        // Create supported_symbols table
        manager
            .create_table(
                Table::create()
                    .table(SupportedSymbols::Table)
                    .if_not_exists()
                    .col(pk_auto(SupportedSymbols::Id))
                    .col(string_len(SupportedSymbols::Symbol, 100).unique_key())
                    .col(string_len(SupportedSymbols::DisplaySymbol, 100))
                    .col(string_len_null(SupportedSymbols::Currency, 100))
                    .col(string_len_null(SupportedSymbols::Description, 200))
                    .col(string_len_null(SupportedSymbols::SymbolType, 100))
                    .col(integer(SupportedSymbols::ExchangeId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supported_symbol_exchange")
                            .from(SupportedSymbols::Table, SupportedSymbols::ExchangeId)
                            .to(SupportedExchanges::Table, SupportedExchanges::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(SupportedSymbols::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupportedExchanges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Phone,
    FirstName,
    PasswordHash,
    FinnhubApiKey,
    IsActive,
    IsStaff,
    IsAdmin,
    DateJoined,
    LastLogin,
}

#[derive(DeriveIden)]
enum SupportedExchanges {
    Table,
    Id,
    Code,
    Name,
    Timezone,
    Country,
}

#[derive(DeriveIden)]
enum SupportedSymbols {
    Table,
    Id,
    Symbol,
    DisplaySymbol,
    Currency,
    Description,
    SymbolType,
    ExchangeId,
}
