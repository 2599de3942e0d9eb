use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub case_type: String,
    pub case_number: String,
    pub filing_year: i32,
    pub search_timestamp: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub response_data: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::case_details::Entity")]
    CaseDetails,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::case_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseDetails.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
