use crate::ids::{CinemaId, ShowroomId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showrooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ShowroomId,
    pub name: String,
    pub total_seats: i32,
    pub cinema_id: CinemaId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cinema::Entity",
        from = "Column::CinemaId",
        to = "super::cinema::Column::Id"
    )]
    Cinema,
    #[sea_orm(has_many = "super::showroom_seat::Entity")]
    ShowroomSeat,
    #[sea_orm(has_many = "super::show::Entity")]
    Show,
}

impl Related<super::cinema::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cinema.def()
    }
}

impl Related<super::showroom_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowroomSeat.def()
    }
}

impl Related<super::show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
