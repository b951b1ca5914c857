use chrono::NaiveDateTime;

pub mod bookings;
pub mod cinema;
pub mod menu;
pub mod shows;
pub mod users;

/// Wall-clock time as stored in the `*_at` and `date`/`time` columns (UTC, no offset).
pub(crate) fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
