use sea_orm::entity::prelude::*;
#[allow(unused_imports)]
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Physical seat category, fixed per showroom seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "vip")]
    Vip,
    #[sea_orm(string_value = "couple")]
    Couple,
    #[sea_orm(string_value = "super_vip")]
    SuperVip,
}

/// State of one seat for one show.
///
/// | from      | to        |
/// |-----------|-----------|
/// | Available | Reserved  |
/// | Reserved  | Booked    |
/// | Reserved  | Available |
/// | Booked    | Available |
/// | Available | Cancelled |
/// | Cancelled | Available |
///
/// `Cancelled` means the seat was withdrawn from sale for that show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ShowSeatStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ShowSeatStatus {
    pub fn can_transition_to(self, next: ShowSeatStatus) -> bool {
        use ShowSeatStatus::*;

        matches!(
            (self, next),
            (Available, Reserved)
                | (Reserved, Booked)
                | (Reserved, Available)
                | (Booked, Available)
                | (Available, Cancelled)
                | (Cancelled, Available)
        )
    }
}

/// Pending -> Confirmed, Pending -> Cancelled, Confirmed -> Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "online")]
    Online,
}
