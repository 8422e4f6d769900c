use sea_orm::entity::prelude::*;

/// A ticker symbol users are allowed to search for.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "supported_symbols")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub symbol: String,
    /// Usually identical to `symbol`.
    pub display_symbol: String,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub symbol_type: Option<String>,
    pub exchange_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supported_exchange::Entity",
        from = "Column::ExchangeId",
        to = "super::supported_exchange::Column::Id",
        on_delete = "Cascade"
    )]
    SupportedExchange,
}

impl Related<super::supported_exchange::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportedExchange.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Looks up a supported symbol by its exact ticker.
    pub async fn find_by_symbol<C: ConnectionTrait>(
        db: &C,
        symbol: &str,
    ) -> Result<Option<Model>, DbErr> {
        Self::find().filter(Column::Symbol.eq(symbol)).one(db).await
    }
}
