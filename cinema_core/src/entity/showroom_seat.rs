use super::sea_orm_active_enums::SeatType;
use crate::ids::{ShowroomId, ShowroomSeatId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical seat. Belongs to its showroom permanently and is shared by every show there.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showroom_seat")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ShowroomSeatId,
    pub seat_number: i32,
    pub seat_type: SeatType,
    pub showroom_id: ShowroomId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::showroom::Entity",
        from = "Column::ShowroomId",
        to = "super::showroom::Column::Id"
    )]
    Showroom,
    #[sea_orm(has_many = "super::show_seat::Entity")]
    ShowSeat,
}

impl Related<super::showroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Showroom.def()
    }
}

impl Related<super::show_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowSeat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
