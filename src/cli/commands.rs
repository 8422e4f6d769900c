pub mod create_superuser;
pub mod download_symbols;
pub mod import_exchanges;
pub mod initdb;
pub mod migrate_and_serve;
pub mod serve;

pub use create_superuser::create_superuser;
pub use download_symbols::download_symbols;
pub use import_exchanges::import_exchanges;
pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use serve::serve;
