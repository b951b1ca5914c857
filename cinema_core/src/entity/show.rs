use crate::ids::{FilmId, ShowId, ShowroomId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A scheduled screening of one film in one showroom.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ShowId,
    pub date: Date,
    pub start_time: DateTime,
    pub end_time: DateTime,
    /// Price of a standard seat; other seat types add their premium on top.
    pub base_price: f64,
    pub showroom_id: ShowroomId,
    pub film_id: FilmId,
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
    #[sea_orm(
        belongs_to = "super::film::Entity",
        from = "Column::FilmId",
        to = "super::film::Column::Id"
    )]
    Film,
    #[sea_orm(has_many = "super::show_seat::Entity")]
    ShowSeat,
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::showroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Showroom.def()
    }
}

impl Related<super::film::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Film.def()
    }
}

impl Related<super::show_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowSeat.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
