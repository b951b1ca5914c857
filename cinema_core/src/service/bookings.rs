use std::collections::HashMap;

use sea_orm::{sea_query::Expr, DatabaseConnection, DatabaseTransaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entity::prelude::*,
    ids::{BookingId, ShowId, ShowSeatId, UserId},
};

use super::now;

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("show not found")]
    ShowNotFound,

    #[error("show has already started")]
    ShowAlreadyStarted,

    #[error("booking not found")]
    BookingNotFound,

    #[error("no seats requested")]
    NoSeatsRequested,

    #[error("only {reserved} of {requested} seats could be reserved")]
    SeatsUnavailable { requested: usize, reserved: usize },

    #[error("booking cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("discount must be a non-negative amount")]
    InvalidDiscount,
}

/// Everything produced by paying for a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub booking: BookingModel,
    pub payment: PaymentModel,
    pub tickets: Vec<TicketModel>,
}

/// A ticket with the physical seat it admits to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedTicket {
    pub ticket: TicketModel,
    pub seat_number: i32,
    pub seat_type: SeatType,
    pub price: f64,
}

/// Reserve-then-confirm booking flow.
///
/// A reservation holds seats for a pending booking; paying confirms the booking and
/// issues one ticket per seat. A seat belongs to at most one live booking: it can only
/// be claimed while `available`, and the claim happens in a single conditional update.
#[derive(Clone)]
pub struct BookingsService {
    db: DatabaseConnection,
}

impl BookingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hold `seats` of `show_id` for `user_id` under a new pending booking.
    ///
    /// All or nothing: if any seat is taken, withdrawn or not part of the show the
    /// booking is not created.
    pub async fn reserve_seats(
        &self,
        user_id: UserId,
        show_id: ShowId,
        seats: &[ShowSeatId],
    ) -> Result<BookingModel, BookingsServiceError> {
        let mut seats = seats.to_vec();
        seats.sort_unstable();
        seats.dedup();

        if seats.is_empty() {
            return Err(BookingsServiceError::NoSeatsRequested);
        }

        let txn = self.db.begin().await?;

        if User::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(BookingsServiceError::UserNotFound);
        }

        let show = Show::find_by_id(show_id)
            .one(&txn)
            .await?
            .ok_or(BookingsServiceError::ShowNotFound)?;

        let time = now();
        if show.start_time <= time {
            return Err(BookingsServiceError::ShowAlreadyStarted);
        }

        let booking = BookingActiveModel {
            number_of_seat: Set(seats.len() as i32),
            time: Set(time),
            status: Set(BookingStatus::Pending),
            user_id: Set(user_id),
            show_id: Set(show_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let claimed = ShowSeat::update_many()
            .col_expr(ShowSeatColumn::Status, Expr::value(ShowSeatStatus::Reserved))
            .col_expr(ShowSeatColumn::BookingId, Expr::value(booking.id))
            .col_expr(ShowSeatColumn::UpdatedAt, Expr::value(time))
            .filter(ShowSeatColumn::Id.is_in(seats.iter().copied()))
            .filter(ShowSeatColumn::ShowId.eq(show_id))
            .filter(ShowSeatColumn::Status.eq(ShowSeatStatus::Available))
            .exec(&txn)
            .await?;

        let reserved = claimed.rows_affected as usize;
        if reserved != seats.len() {
            txn.rollback().await?;

            tracing::warn!(
                show_id = %show_id,
                user_id = %user_id,
                requested = seats.len(),
                reserved,
                "reservation rejected"
            );
            return Err(BookingsServiceError::SeatsUnavailable {
                requested: seats.len(),
                reserved,
            });
        }

        txn.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            show_id = %show_id,
            seats = reserved,
            "seats reserved"
        );
        Ok(booking)
    }

    /// Record payment for a pending booking and issue its tickets.
    ///
    /// `discount` is an absolute amount taken off the sum of the seat prices.
    pub async fn confirm_booking(
        &self,
        booking_id: BookingId,
        payment_method: PaymentMethod,
        discount: f64,
    ) -> Result<Confirmation, BookingsServiceError> {
        if !discount.is_finite() || discount < 0.0 {
            return Err(BookingsServiceError::InvalidDiscount);
        }

        let txn = self.db.begin().await?;

        let booking = Self::booking_in(&txn, booking_id).await?;
        Self::check_transition(booking.status, BookingStatus::Confirmed)?;

        let seats = ShowSeat::find()
            .filter(ShowSeatColumn::BookingId.eq(booking.id))
            .filter(ShowSeatColumn::Status.eq(ShowSeatStatus::Reserved))
            .order_by_asc(ShowSeatColumn::Id)
            .all(&txn)
            .await?;

        if seats.len() != booking.number_of_seat as usize {
            return Err(BookingsServiceError::SeatsUnavailable {
                requested: booking.number_of_seat as usize,
                reserved: seats.len(),
            });
        }

        let total: f64 = seats.iter().map(|seat| seat.price).sum();
        let amount = ((total - discount).max(0.0) * 100.0).round() / 100.0;
        let paid_at = now();

        let payment = PaymentActiveModel {
            amount: Set(amount),
            date: Set(paid_at),
            discount: Set(discount),
            transaction_id: Set(Uuid::now_v7()),
            payment_method: Set(payment_method),
            booking_id: Set(booking.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        ShowSeat::update_many()
            .col_expr(ShowSeatColumn::Status, Expr::value(ShowSeatStatus::Booked))
            .col_expr(ShowSeatColumn::UpdatedAt, Expr::value(paid_at))
            .filter(ShowSeatColumn::BookingId.eq(booking.id))
            .filter(ShowSeatColumn::Status.eq(ShowSeatStatus::Reserved))
            .exec(&txn)
            .await?;

        let mut active: BookingActiveModel = booking.into();
        active.status = Set(BookingStatus::Confirmed);
        active.updated_at = Set(paid_at);
        let booking = active.update(&txn).await?;

        let tickets = seats.iter().map(|seat| TicketActiveModel {
            show_id: Set(booking.show_id),
            payment_id: Set(payment.id),
            booking_id: Set(booking.id),
            user_id: Set(booking.user_id),
            show_seat_id: Set(seat.id),
            date: Set(paid_at),
            ..Default::default()
        });
        Ticket::insert_many(tickets).exec(&txn).await?;

        let tickets = Ticket::find()
            .filter(TicketColumn::BookingId.eq(booking.id))
            .order_by_asc(TicketColumn::Id)
            .all(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            payment_id = %payment.id,
            amount = payment.amount,
            tickets = tickets.len(),
            "booking confirmed"
        );
        Ok(Confirmation {
            booking,
            payment,
            tickets,
        })
    }

    /// Cancel a pending or confirmed booking and put its seats back on sale.
    ///
    /// Tickets of a confirmed booking are voided; the payment row is kept.
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<BookingModel, BookingsServiceError> {
        let txn = self.db.begin().await?;

        let booking = Self::booking_in(&txn, booking_id).await?;
        Self::check_transition(booking.status, BookingStatus::Cancelled)?;

        let cancelled_at = now();

        let released = ShowSeat::update_many()
            .col_expr(ShowSeatColumn::Status, Expr::value(ShowSeatStatus::Available))
            .col_expr(ShowSeatColumn::BookingId, Expr::value(Option::<BookingId>::None))
            .col_expr(ShowSeatColumn::UpdatedAt, Expr::value(cancelled_at))
            .filter(ShowSeatColumn::BookingId.eq(booking.id))
            .filter(
                ShowSeatColumn::Status
                    .is_in([ShowSeatStatus::Reserved, ShowSeatStatus::Booked]),
            )
            .exec(&txn)
            .await?;

        Ticket::delete_many()
            .filter(TicketColumn::BookingId.eq(booking.id))
            .exec(&txn)
            .await?;

        let mut active: BookingActiveModel = booking.into();
        active.status = Set(BookingStatus::Cancelled);
        active.updated_at = Set(cancelled_at);
        let booking = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            released = released.rows_affected,
            "booking cancelled"
        );
        Ok(booking)
    }

    pub async fn get_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<BookingModel, BookingsServiceError> {
        Booking::find_by_id(booking_id)
            .one(&self.db)
            .await?
            .ok_or(BookingsServiceError::BookingNotFound)
    }

    /// Bookings of a user, newest first
    pub async fn list_bookings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookingModel>, BookingsServiceError> {
        let bookings = Booking::find()
            .filter(BookingColumn::UserId.eq(user_id))
            .order_by_desc(BookingColumn::Time)
            .order_by_desc(BookingColumn::Id)
            .all(&self.db)
            .await?;

        Ok(bookings)
    }

    /// Show seats currently held by a booking
    pub async fn booking_seats(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<ShowSeatModel>, BookingsServiceError> {
        let booking = self.get_booking(booking_id).await?;

        let seats = booking
            .find_related(ShowSeat)
            .order_by_asc(ShowSeatColumn::Id)
            .all(&self.db)
            .await?;

        Ok(seats)
    }

    /// Tickets of a booking with seat number and type, in issue order
    pub async fn tickets_for_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<IssuedTicket>, BookingsServiceError> {
        let booking = self.get_booking(booking_id).await?;

        let tickets = booking
            .find_related(Ticket)
            .order_by_asc(TicketColumn::Id)
            .all(&self.db)
            .await?;

        if tickets.is_empty() {
            return Ok(Vec::new());
        }

        let seats: HashMap<ShowSeatId, (ShowSeatModel, Option<ShowroomSeatModel>)> =
            ShowSeat::find()
                .filter(ShowSeatColumn::Id.is_in(tickets.iter().map(|ticket| ticket.show_seat_id)))
                .find_also_related(ShowroomSeat)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|(show_seat, seat)| (show_seat.id, (show_seat, seat)))
                .collect();

        let issued = tickets
            .into_iter()
            .filter_map(|ticket| {
                let (show_seat, seat) = seats.get(&ticket.show_seat_id)?;
                let seat = seat.as_ref()?;

                Some(IssuedTicket {
                    seat_number: seat.seat_number,
                    seat_type: seat.seat_type,
                    price: show_seat.price,
                    ticket,
                })
            })
            .collect();

        Ok(issued)
    }

    async fn booking_in(
        txn: &DatabaseTransaction,
        booking_id: BookingId,
    ) -> Result<BookingModel, BookingsServiceError> {
        Booking::find_by_id(booking_id)
            .one(txn)
            .await?
            .ok_or(BookingsServiceError::BookingNotFound)
    }

    fn check_transition(
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<(), BookingsServiceError> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(BookingsServiceError::InvalidTransition { from, to })
        }
    }
}
