use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{sea_query::Expr, DatabaseConnection, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{CinemaId, FilmId, ShowroomId},
};

use super::now;

#[derive(Debug, Error)]
pub enum CinemaServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("a cinema already exists")]
    CinemaAlreadyExists,

    #[error("cinema not found")]
    CinemaNotFound,

    #[error("showroom not found")]
    ShowroomNotFound,

    #[error("film not found")]
    FilmNotFound,

    #[error("showroom layout has no seats")]
    EmptyLayout,

    #[error("seat number {0} appears more than once in the layout")]
    DuplicateSeatNumber(i32),

    #[error("film duration must be a positive number of minutes")]
    InvalidDuration,
}

/// One physical seat in a showroom layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSpec {
    pub seat_number: i32,
    pub seat_type: SeatType,
}

impl SeatSpec {
    pub fn new(seat_number: i32, seat_type: SeatType) -> Self {
        Self {
            seat_number,
            seat_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFilm {
    pub title: String,
    pub description: Option<String>,
    /// Minutes
    pub duration: i32,
    pub language: String,
    pub genre: String,
    pub release_date: NaiveDate,
    pub country: String,
}

/// Administration of the (single) cinema: the building, its showrooms and the film catalogue.
#[derive(Clone)]
pub struct CinemaService {
    db: DatabaseConnection,
}

impl CinemaService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the cinema. Only one cinema is ever managed.
    pub async fn create_cinema(
        &self,
        name: String,
        address: String,
        phone: String,
    ) -> Result<CinemaModel, CinemaServiceError> {
        let txn = self.db.begin().await?;

        if Cinema::find().count(&txn).await? > 0 {
            return Err(CinemaServiceError::CinemaAlreadyExists);
        }

        // idx_cinema_single backs the count check against writers outside this service
        let cinema = CinemaActiveModel {
            name: Set(name),
            total_showrooms: Set(0),
            address: Set(address),
            phone: Set(phone),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CinemaServiceError::CinemaAlreadyExists
            } else {
                CinemaServiceError::DbError(err)
            }
        })?;

        txn.commit().await?;

        tracing::info!(cinema_id = %cinema.id, "cinema created");
        Ok(cinema)
    }

    pub async fn get_cinema(&self) -> Result<CinemaModel, CinemaServiceError> {
        Cinema::find()
            .one(&self.db)
            .await?
            .ok_or(CinemaServiceError::CinemaNotFound)
    }

    /// Delete the cinema along with its showrooms, seats, shows and everything booked for them
    pub async fn delete_cinema(&self, cinema_id: CinemaId) -> Result<(), CinemaServiceError> {
        let result = Cinema::delete_by_id(cinema_id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(CinemaServiceError::CinemaNotFound);
        }

        tracing::info!(cinema_id = %cinema_id, "cinema deleted");
        Ok(())
    }

    /// Add a showroom together with its fixed seating.
    ///
    /// The layout is configured here once; every show in the showroom reuses it.
    pub async fn add_showroom(
        &self,
        cinema_id: CinemaId,
        name: String,
        layout: &[SeatSpec],
    ) -> Result<(ShowroomModel, Vec<ShowroomSeatModel>), CinemaServiceError> {
        if layout.is_empty() {
            return Err(CinemaServiceError::EmptyLayout);
        }

        let mut seen = HashSet::with_capacity(layout.len());
        for spec in layout {
            if !seen.insert(spec.seat_number) {
                return Err(CinemaServiceError::DuplicateSeatNumber(spec.seat_number));
            }
        }

        let txn = self.db.begin().await?;

        if Cinema::find_by_id(cinema_id).one(&txn).await?.is_none() {
            return Err(CinemaServiceError::CinemaNotFound);
        }

        let showroom = ShowroomActiveModel {
            name: Set(name),
            total_seats: Set(layout.len() as i32),
            cinema_id: Set(cinema_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let seats = layout.iter().map(|spec| ShowroomSeatActiveModel {
            seat_number: Set(spec.seat_number),
            seat_type: Set(spec.seat_type),
            showroom_id: Set(showroom.id),
            ..Default::default()
        });
        ShowroomSeat::insert_many(seats).exec(&txn).await?;

        Cinema::update_many()
            .col_expr(
                CinemaColumn::TotalShowrooms,
                Expr::col(CinemaColumn::TotalShowrooms).add(1),
            )
            .col_expr(CinemaColumn::UpdatedAt, Expr::value(now()))
            .filter(CinemaColumn::Id.eq(cinema_id))
            .exec(&txn)
            .await?;

        let seats = ShowroomSeat::find()
            .filter(ShowroomSeatColumn::ShowroomId.eq(showroom.id))
            .order_by_asc(ShowroomSeatColumn::SeatNumber)
            .all(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(
            showroom_id = %showroom.id,
            seats = seats.len(),
            "showroom configured"
        );
        Ok((showroom, seats))
    }

    pub async fn list_showrooms(
        &self,
        cinema_id: CinemaId,
    ) -> Result<Vec<ShowroomModel>, CinemaServiceError> {
        let showrooms = Showroom::find()
            .filter(ShowroomColumn::CinemaId.eq(cinema_id))
            .order_by_asc(ShowroomColumn::Id)
            .all(&self.db)
            .await?;

        Ok(showrooms)
    }

    /// Physical seats of a showroom, by seat number
    pub async fn showroom_seats(
        &self,
        showroom_id: ShowroomId,
    ) -> Result<Vec<ShowroomSeatModel>, CinemaServiceError> {
        let showroom = Showroom::find_by_id(showroom_id)
            .one(&self.db)
            .await?
            .ok_or(CinemaServiceError::ShowroomNotFound)?;

        let seats = showroom
            .find_related(ShowroomSeat)
            .order_by_asc(ShowroomSeatColumn::SeatNumber)
            .all(&self.db)
            .await?;

        Ok(seats)
    }

    pub async fn add_film(&self, film: NewFilm) -> Result<FilmModel, CinemaServiceError> {
        if film.duration <= 0 {
            return Err(CinemaServiceError::InvalidDuration);
        }

        let film = FilmActiveModel {
            title: Set(film.title),
            description: Set(film.description),
            duration: Set(film.duration),
            language: Set(film.language),
            genre: Set(film.genre),
            release_date: Set(film.release_date),
            country: Set(film.country),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(film_id = %film.id, title = %film.title, "film added");
        Ok(film)
    }

    pub async fn get_film(&self, film_id: FilmId) -> Result<FilmModel, CinemaServiceError> {
        Film::find_by_id(film_id)
            .one(&self.db)
            .await?
            .ok_or(CinemaServiceError::FilmNotFound)
    }

    pub async fn list_films(&self) -> Result<Vec<FilmModel>, CinemaServiceError> {
        let films = Film::find()
            .order_by_asc(FilmColumn::Title)
            .all(&self.db)
            .await?;

        Ok(films)
    }
}
