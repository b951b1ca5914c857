use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, Query},
    DatabaseConnection,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::SeatPremiums,
    entity::prelude::*,
    ids::{FilmId, ShowId, ShowSeatId, ShowroomId},
};

use super::now;

#[derive(Debug, Error)]
pub enum ShowsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("showroom not found")]
    ShowroomNotFound,

    #[error("film not found")]
    FilmNotFound,

    #[error("show not found")]
    ShowNotFound,

    #[error("seat not found")]
    SeatNotFound,

    #[error("show must end after it starts")]
    InvalidTimeWindow,

    #[error("show is shorter than the film ({duration} minutes)")]
    ShorterThanFilm { duration: i32 },

    #[error("base price must be a non-negative amount")]
    InvalidPrice,

    #[error("showroom is already busy with show {0}")]
    Overlap(ShowId),

    #[error("seat cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        from: ShowSeatStatus,
        to: ShowSeatStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShow {
    pub showroom_id: ShowroomId,
    pub film_id: FilmId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub base_price: f64,
}

/// A seat as a customer sees it for one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAvailability {
    pub show_seat_id: ShowSeatId,
    pub seat_number: i32,
    pub seat_type: SeatType,
    pub price: f64,
    pub status: ShowSeatStatus,
}

/// Scheduling of shows and the per-show seat map.
#[derive(Clone)]
pub struct ShowsService {
    db: DatabaseConnection,
    premiums: SeatPremiums,
}

impl ShowsService {
    pub fn new(db: DatabaseConnection, premiums: SeatPremiums) -> Self {
        Self { db, premiums }
    }

    /// Schedule a show and open every seat of its showroom for sale.
    ///
    /// A showroom runs one show at a time; different showrooms may run at the same time.
    pub async fn schedule_show(&self, new_show: NewShow) -> Result<ShowModel, ShowsServiceError> {
        if new_show.end_time <= new_show.start_time {
            return Err(ShowsServiceError::InvalidTimeWindow);
        }

        if !new_show.base_price.is_finite() || new_show.base_price < 0.0 {
            return Err(ShowsServiceError::InvalidPrice);
        }

        let txn = self.db.begin().await?;

        if Showroom::find_by_id(new_show.showroom_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ShowsServiceError::ShowroomNotFound);
        }

        let film = Film::find_by_id(new_show.film_id)
            .one(&txn)
            .await?
            .ok_or(ShowsServiceError::FilmNotFound)?;

        let window = new_show.end_time - new_show.start_time;
        if window.num_minutes() < i64::from(film.duration) {
            return Err(ShowsServiceError::ShorterThanFilm {
                duration: film.duration,
            });
        }

        // Half-open windows: a show may start exactly when the previous one ends
        let clash = Show::find()
            .filter(ShowColumn::ShowroomId.eq(new_show.showroom_id))
            .filter(ShowColumn::StartTime.lt(new_show.end_time))
            .filter(ShowColumn::EndTime.gt(new_show.start_time))
            .one(&txn)
            .await?;

        if let Some(existing) = clash {
            tracing::warn!(
                showroom_id = %new_show.showroom_id,
                existing = %existing.id,
                "rejected overlapping show"
            );
            return Err(ShowsServiceError::Overlap(existing.id));
        }

        let show = ShowActiveModel {
            date: Set(new_show.start_time.date()),
            start_time: Set(new_show.start_time),
            end_time: Set(new_show.end_time),
            base_price: Set(new_show.base_price),
            showroom_id: Set(new_show.showroom_id),
            film_id: Set(new_show.film_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let layout = ShowroomSeat::find()
            .filter(ShowroomSeatColumn::ShowroomId.eq(show.showroom_id))
            .order_by_asc(ShowroomSeatColumn::SeatNumber)
            .all(&txn)
            .await?;

        if !layout.is_empty() {
            let seats = layout.iter().map(|seat| ShowSeatActiveModel {
                status: Set(ShowSeatStatus::Available),
                price: Set(self.premiums.price_for(seat.seat_type, show.base_price)),
                showroom_seat_id: Set(seat.id),
                show_id: Set(show.id),
                booking_id: Set(None),
                ..Default::default()
            });
            ShowSeat::insert_many(seats).exec(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            show_id = %show.id,
            showroom_id = %show.showroom_id,
            film_id = %show.film_id,
            seats = layout.len(),
            "show scheduled"
        );
        Ok(show)
    }

    pub async fn get_show(&self, show_id: ShowId) -> Result<ShowModel, ShowsServiceError> {
        Show::find_by_id(show_id)
            .one(&self.db)
            .await?
            .ok_or(ShowsServiceError::ShowNotFound)
    }

    /// When a film can be watched, earliest first
    pub async fn list_shows_for_film(
        &self,
        film_id: FilmId,
    ) -> Result<Vec<ShowModel>, ShowsServiceError> {
        let shows = Show::find()
            .filter(ShowColumn::FilmId.eq(film_id))
            .order_by_asc(ShowColumn::StartTime)
            .all(&self.db)
            .await?;

        Ok(shows)
    }

    /// Shows starting at or after `from` that are not booked out, earliest first
    pub async fn list_bookable_shows(
        &self,
        from: NaiveDateTime,
    ) -> Result<Vec<(ShowModel, Option<FilmModel>)>, ShowsServiceError> {
        let with_free_seats = Query::select()
            .column(ShowSeatColumn::ShowId)
            .from(ShowSeat)
            .and_where(ShowSeatColumn::Status.eq(ShowSeatStatus::Available))
            .to_owned();

        let shows = Show::find()
            .filter(ShowColumn::StartTime.gte(from))
            .filter(ShowColumn::Id.in_subquery(with_free_seats))
            .find_also_related(Film)
            .order_by_asc(ShowColumn::StartTime)
            .all(&self.db)
            .await?;

        Ok(shows)
    }

    /// Every seat of a show with its current state, by seat number
    pub async fn seat_map(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<SeatAvailability>, ShowsServiceError> {
        self.seats_with_status(show_id, None).await
    }

    /// Seats still free for a show, by seat number
    pub async fn available_seats(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<SeatAvailability>, ShowsServiceError> {
        self.seats_with_status(show_id, Some(ShowSeatStatus::Available))
            .await
    }

    async fn seats_with_status(
        &self,
        show_id: ShowId,
        status: Option<ShowSeatStatus>,
    ) -> Result<Vec<SeatAvailability>, ShowsServiceError> {
        if Show::find_by_id(show_id).one(&self.db).await?.is_none() {
            return Err(ShowsServiceError::ShowNotFound);
        }

        let mut query = ShowSeat::find().filter(ShowSeatColumn::ShowId.eq(show_id));
        if let Some(status) = status {
            query = query.filter(ShowSeatColumn::Status.eq(status));
        }

        let rows = query
            .find_also_related(ShowroomSeat)
            .order_by_asc(ShowroomSeatColumn::SeatNumber)
            .all(&self.db)
            .await?;

        let seats = rows
            .into_iter()
            .filter_map(|(show_seat, seat)| {
                seat.map(|seat| SeatAvailability {
                    show_seat_id: show_seat.id,
                    seat_number: seat.seat_number,
                    seat_type: seat.seat_type,
                    price: show_seat.price,
                    status: show_seat.status,
                })
            })
            .collect();

        Ok(seats)
    }

    /// Take a free seat out of sale for this show (broken seat, staff hold, ...)
    pub async fn withdraw_seat(
        &self,
        show_seat_id: ShowSeatId,
    ) -> Result<ShowSeatModel, ShowsServiceError> {
        self.transition_seat(
            show_seat_id,
            ShowSeatStatus::Available,
            ShowSeatStatus::Cancelled,
        )
        .await
    }

    /// Put a withdrawn seat back on sale
    pub async fn reinstate_seat(
        &self,
        show_seat_id: ShowSeatId,
    ) -> Result<ShowSeatModel, ShowsServiceError> {
        self.transition_seat(
            show_seat_id,
            ShowSeatStatus::Cancelled,
            ShowSeatStatus::Available,
        )
        .await
    }

    async fn transition_seat(
        &self,
        show_seat_id: ShowSeatId,
        from: ShowSeatStatus,
        to: ShowSeatStatus,
    ) -> Result<ShowSeatModel, ShowsServiceError> {
        debug_assert!(from.can_transition_to(to));

        // Conditional on the current status so a concurrent reservation wins cleanly
        let result = ShowSeat::update_many()
            .col_expr(ShowSeatColumn::Status, Expr::value(to))
            .col_expr(ShowSeatColumn::UpdatedAt, Expr::value(now()))
            .filter(ShowSeatColumn::Id.eq(show_seat_id))
            .filter(ShowSeatColumn::Status.eq(from))
            .exec(&self.db)
            .await?;

        let seat = ShowSeat::find_by_id(show_seat_id)
            .one(&self.db)
            .await?
            .ok_or(ShowsServiceError::SeatNotFound)?;

        if result.rows_affected == 0 {
            return Err(ShowsServiceError::InvalidTransition {
                from: seat.status,
                to,
            });
        }

        tracing::info!(show_seat_id = %show_seat_id, status = ?to, "seat status changed");
        Ok(seat)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::service::cinema::{
        tests::{sample_film, sample_layout},
        CinemaService,
    };
    use crate::test_utils;
    use chrono::NaiveDate;

    pub(crate) fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2099, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub(crate) struct Fixture {
        pub db: DatabaseConnection,
        pub cinema: CinemaService,
        pub shows: ShowsService,
        pub showrooms: Vec<ShowroomModel>,
        pub film: FilmModel,
    }

    /// A cinema with two four-seat showrooms and one two-hour film.
    pub(crate) async fn fixture() -> Fixture {
        let db = test_utils::create_test_db_with_migrations().await;
        let cinema = CinemaService::new(db.clone());
        let shows = ShowsService::new(db.clone(), SeatPremiums::default());

        let roxy = cinema
            .create_cinema("Roxy".to_string(), "1 Main St".to_string(), "555".to_string())
            .await
            .unwrap();

        let mut showrooms = Vec::new();
        for name in ["Hall 1", "Hall 2"] {
            let (showroom, _) = cinema
                .add_showroom(roxy.id, name.to_string(), &sample_layout())
                .await
                .unwrap();
            showrooms.push(showroom);
        }

        let film = cinema.add_film(sample_film("Heat", 120)).await.unwrap();

        Fixture {
            db,
            cinema,
            shows,
            showrooms,
            film,
        }
    }

    impl Fixture {
        pub(crate) fn new_show(&self, room: usize, start: NaiveDateTime, hours: i64) -> NewShow {
            NewShow {
                showroom_id: self.showrooms[room].id,
                film_id: self.film.id,
                start_time: start,
                end_time: start + chrono::Duration::hours(hours),
                base_price: 10.0,
            }
        }
    }

    #[tokio::test]
    async fn test_schedule_show_prices_seats_by_type() {
        let fx = fixture().await;

        let show = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 18, 0), 2))
            .await
            .expect("Failed to schedule show");

        assert_eq!(show.date, NaiveDate::from_ymd_opt(2099, 6, 13).unwrap());

        let seats = fx.shows.seat_map(show.id).await.unwrap();
        let prices: Vec<f64> = seats.iter().map(|seat| seat.price).collect();
        assert_eq!(prices, vec![10.0, 10.0, 15.0, 20.0]);
        assert!(seats
            .iter()
            .all(|seat| seat.status == ShowSeatStatus::Available));
    }

    #[tokio::test]
    async fn test_show_seats_come_from_the_shows_showroom() {
        let fx = fixture().await;

        let show = fx
            .shows
            .schedule_show(fx.new_show(1, at(13, 18, 0), 2))
            .await
            .unwrap();

        let rows = ShowSeat::find()
            .filter(ShowSeatColumn::ShowId.eq(show.id))
            .find_also_related(ShowroomSeat)
            .all(&fx.shows.db)
            .await
            .unwrap();

        assert_eq!(rows.len(), 4);
        for (_, seat) in rows {
            assert_eq!(seat.unwrap().showroom_id, fx.showrooms[1].id);
        }
    }

    #[tokio::test]
    async fn test_overlapping_shows_rejected_in_same_showroom() {
        let fx = fixture().await;

        let first = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 18, 0), 2))
            .await
            .unwrap();

        let overlapping = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 19, 0), 2))
            .await;
        assert!(matches!(overlapping, Err(ShowsServiceError::Overlap(id)) if id == first.id));

        // Back to back is fine
        fx.shows
            .schedule_show(fx.new_show(0, at(13, 20, 0), 2))
            .await
            .expect("back to back show should be accepted");

        // Same time, other showroom
        fx.shows
            .schedule_show(fx.new_show(1, at(13, 18, 0), 2))
            .await
            .expect("parallel show in another showroom should be accepted");
    }

    #[tokio::test]
    async fn test_schedule_show_validation() {
        let fx = fixture().await;

        let mut backwards = fx.new_show(0, at(13, 18, 0), 2);
        backwards.end_time = backwards.start_time;
        assert!(matches!(
            fx.shows.schedule_show(backwards).await,
            Err(ShowsServiceError::InvalidTimeWindow)
        ));

        assert!(matches!(
            fx.shows.schedule_show(fx.new_show(0, at(13, 18, 0), 1)).await,
            Err(ShowsServiceError::ShorterThanFilm { duration: 120 })
        ));

        let mut negative = fx.new_show(0, at(13, 18, 0), 2);
        negative.base_price = -1.0;
        assert!(matches!(
            fx.shows.schedule_show(negative).await,
            Err(ShowsServiceError::InvalidPrice)
        ));

        let mut no_film = fx.new_show(0, at(13, 18, 0), 2);
        no_film.film_id = FilmId::new(404);
        assert!(matches!(
            fx.shows.schedule_show(no_film).await,
            Err(ShowsServiceError::FilmNotFound)
        ));

        let mut no_room = fx.new_show(0, at(13, 18, 0), 2);
        no_room.showroom_id = ShowroomId::new(404);
        assert!(matches!(
            fx.shows.schedule_show(no_room).await,
            Err(ShowsServiceError::ShowroomNotFound)
        ));

        assert_eq!(Show::find().count(&fx.shows.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_shows_for_film_in_time_order() {
        let fx = fixture().await;

        let late = fx
            .shows
            .schedule_show(fx.new_show(0, at(14, 20, 0), 2))
            .await
            .unwrap();
        let early = fx
            .shows
            .schedule_show(fx.new_show(1, at(13, 20, 0), 2))
            .await
            .unwrap();

        let shows = fx.shows.list_shows_for_film(fx.film.id).await.unwrap();
        let ids: Vec<ShowId> = shows.iter().map(|show| show.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn test_booked_out_and_past_shows_are_not_bookable() {
        let fx = fixture().await;

        let past = fx
            .shows
            .schedule_show(fx.new_show(0, at(1, 18, 0), 2))
            .await
            .unwrap();
        let full = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 18, 0), 2))
            .await
            .unwrap();
        let open = fx
            .shows
            .schedule_show(fx.new_show(1, at(13, 18, 0), 2))
            .await
            .unwrap();

        for seat in fx.shows.available_seats(full.id).await.unwrap() {
            fx.shows.withdraw_seat(seat.show_seat_id).await.unwrap();
        }

        let bookable = fx.shows.list_bookable_shows(at(10, 0, 0)).await.unwrap();
        let ids: Vec<ShowId> = bookable.iter().map(|(show, _)| show.id).collect();
        assert_eq!(ids, vec![open.id]);
        assert_eq!(bookable[0].1.as_ref().unwrap().title, "Heat");
        assert!(!ids.contains(&past.id));
    }

    #[tokio::test]
    async fn test_withdraw_and_reinstate_seat() {
        let fx = fixture().await;
        let show = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 18, 0), 2))
            .await
            .unwrap();
        let seat = fx.shows.available_seats(show.id).await.unwrap()[0].clone();

        let withdrawn = fx.shows.withdraw_seat(seat.show_seat_id).await.unwrap();
        assert_eq!(withdrawn.status, ShowSeatStatus::Cancelled);
        assert_eq!(fx.shows.available_seats(show.id).await.unwrap().len(), 3);

        let again = fx.shows.withdraw_seat(seat.show_seat_id).await;
        assert!(matches!(
            again,
            Err(ShowsServiceError::InvalidTransition {
                from: ShowSeatStatus::Cancelled,
                to: ShowSeatStatus::Cancelled
            })
        ));

        let reinstated = fx.shows.reinstate_seat(seat.show_seat_id).await.unwrap();
        assert_eq!(reinstated.status, ShowSeatStatus::Available);

        assert!(matches!(
            fx.shows.withdraw_seat(ShowSeatId::new(999)).await,
            Err(ShowsServiceError::SeatNotFound)
        ));
    }
}
