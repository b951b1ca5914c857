use super::sea_orm_active_enums::ShowSeatStatus;
use crate::ids::{BookingId, ShowId, ShowSeatId, ShowroomSeatId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The bookable instance of a physical seat for one show.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "show_seat")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ShowSeatId,
    pub status: ShowSeatStatus,
    pub price: f64,
    pub showroom_seat_id: ShowroomSeatId,
    pub show_id: ShowId,
    pub booking_id: Option<BookingId>, // NULL while nobody holds the seat
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::showroom_seat::Entity",
        from = "Column::ShowroomSeatId",
        to = "super::showroom_seat::Column::Id"
    )]
    ShowroomSeat,
    #[sea_orm(
        belongs_to = "super::show::Entity",
        from = "Column::ShowId",
        to = "super::show::Column::Id"
    )]
    Show,
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
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
