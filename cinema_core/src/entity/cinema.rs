use crate::ids::CinemaId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cinema")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: CinemaId,
    pub name: String,
    pub total_showrooms: i32,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::showroom::Entity")]
    Showroom,
}

impl Related<super::showroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Showroom.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
