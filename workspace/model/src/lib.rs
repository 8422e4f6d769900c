pub mod accounts;
pub mod entities;
pub mod password;

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
        ModelTrait, Set,
    };

    use crate::accounts;
    use crate::entities::prelude::*;
    use crate::entities::{supported_exchange, supported_symbol};

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn exchange(code: &str, name: &str) -> supported_exchange::ActiveModel {
        supported_exchange::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            timezone: Set(Some("America/New_York".to_string())),
            country: Set(Some("US".to_string())),
            ..Default::default()
        }
    }

    fn symbol(ticker: &str, exchange_id: i32) -> supported_symbol::ActiveModel {
        supported_symbol::ActiveModel {
            symbol: Set(ticker.to_string()),
            display_symbol: Set(ticker.to_string()),
            currency: Set(Some("USD".to_string())),
            description: Set(Some(format!("{} INC", ticker))),
            symbol_type: Set(Some("Common Stock".to_string())),
            exchange_id: Set(exchange_id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let us = exchange("US", "US exchanges (NYSE, Nasdaq)").insert(&db).await?;
        let london = exchange("L", "LONDON STOCK EXCHANGE").insert(&db).await?;

        symbol("AAPL", us.id).insert(&db).await?;
        symbol("MSFT", us.id).insert(&db).await?;
        symbol("VOD.L", london.id).insert(&db).await?;

        let found = SupportedSymbol::find_by_symbol(&db, "AAPL").await?.unwrap();
        assert_eq!(found.display_symbol, "AAPL");
        assert_eq!(found.exchange_id, us.id);
        assert!(SupportedSymbol::find_by_symbol(&db, "aapl").await?.is_none());

        let parent = found.find_related(SupportedExchange).one(&db).await?.unwrap();
        assert_eq!(parent.code, "US");

        let us_symbols = us.find_related(SupportedSymbol).all(&db).await?;
        assert_eq!(us_symbols.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_symbol_and_exchange_uniqueness() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let us = exchange("US", "US exchanges").insert(&db).await?;
        assert!(exchange("US", "Duplicate").insert(&db).await.is_err());

        symbol("AAPL", us.id).insert(&db).await?;
        assert!(symbol("AAPL", us.id).insert(&db).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_exchange_cascades_to_symbols() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let us = exchange("US", "US exchanges").insert(&db).await?;
        symbol("AAPL", us.id).insert(&db).await?;
        us.delete(&db).await?;

        assert!(SupportedSymbol::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_users_are_independent_of_market_data() -> Result<(), DbErr> {
        let db = setup_db().await?;
        accounts::register_user(&db, "user1", "password").await.unwrap();
        accounts::register_user(&db, "user2", "password").await.unwrap();

        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "user1"));
        Ok(())
    }
}
