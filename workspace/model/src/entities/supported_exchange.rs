use sea_orm::entity::prelude::*;

/// A stock exchange Finnhub can list symbols for.
/// Rows come from the bundled exchange reference file.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "supported_exchanges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Finnhub exchange code, e.g. "US" or "L". At most 4 characters.
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub timezone: Option<String>,
    pub country: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supported_symbol::Entity")]
    SupportedSymbol,
}

impl Related<super::supported_symbol::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportedSymbol.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
