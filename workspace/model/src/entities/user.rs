use sea_orm::entity::prelude::*;

/// Represents a user of the system.
///
/// Besides the credentials the record carries the user's own Finnhub API key,
/// which every dashboard request uses to talk to the upstream service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Optional for self-registered users; the user factory requires it.
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: String,
    /// PHC-formatted argon2 hash, never the raw password.
    pub password_hash: String,
    #[sea_orm(unique)]
    pub finnhub_api_key: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}
