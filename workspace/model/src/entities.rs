//! SeaORM entities for the accounts store and the local market-data
//! reference tables.

pub mod supported_exchange;
pub mod supported_symbol;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::supported_exchange::Entity as SupportedExchange;
    pub use super::supported_symbol::Entity as SupportedSymbol;
    pub use super::user::Entity as User;
}
