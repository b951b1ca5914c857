use sea_orm::{
    sea_query::{Expr, Query},
    DatabaseConnection,
};
use thiserror::Error;

use crate::{entity::prelude::*, ids::BookingId, ids::UserId};

use super::now;

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("email already registered")]
    EmailTaken,
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a customer who can book seats
    pub async fn create_user(
        &self,
        name: String,
        email: String,
    ) -> Result<UserModel, UsersServiceError> {
        let taken = User::find()
            .filter(UserColumn::Email.eq(email.as_str()))
            .one(&self.db)
            .await?
            .is_some();

        if taken {
            return Err(UsersServiceError::EmailTaken);
        }

        let user = UserActiveModel {
            name: Set(name),
            email: Set(email),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserModel, UsersServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    /// Remove a customer with their bookings, payments and tickets.
    ///
    /// Seats they held go back on sale first.
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), UsersServiceError> {
        let txn = self.db.begin().await?;

        if User::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(UsersServiceError::UserNotFound);
        }

        let their_bookings = Query::select()
            .column(BookingColumn::Id)
            .from(Booking)
            .and_where(BookingColumn::UserId.eq(user_id))
            .to_owned();

        let released = ShowSeat::update_many()
            .col_expr(ShowSeatColumn::Status, Expr::value(ShowSeatStatus::Available))
            .col_expr(ShowSeatColumn::BookingId, Expr::value(Option::<BookingId>::None))
            .col_expr(ShowSeatColumn::UpdatedAt, Expr::value(now()))
            .filter(ShowSeatColumn::BookingId.in_subquery(their_bookings))
            .exec(&txn)
            .await?;

        User::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            user_id = %user_id,
            released = released.rows_affected,
            "user deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::bookings::{BookingsService, BookingsServiceError};
    use crate::service::shows::tests::{at, fixture};
    use crate::test_utils;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let service = UsersService::new(test_utils::create_test_db_with_migrations().await);

        let user = service
            .create_user("Ada".to_string(), "ada@example.com".to_string())
            .await
            .expect("Failed to create user");

        let fetched = service.get_user(user.id).await.unwrap();
        assert_eq!(fetched.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let service = UsersService::new(test_utils::create_test_db_with_migrations().await);

        service
            .create_user("Ada".to_string(), "ada@example.com".to_string())
            .await
            .unwrap();

        let result = service
            .create_user("Other Ada".to_string(), "ada@example.com".to_string())
            .await;
        assert!(matches!(result, Err(UsersServiceError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let service = UsersService::new(test_utils::create_test_db_with_migrations().await);

        let result = service.get_user(UserId::new(12)).await;
        assert!(matches!(result, Err(UsersServiceError::UserNotFound)));
        assert!(matches!(
            service.delete_user(UserId::new(12)).await,
            Err(UsersServiceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_user_puts_their_seats_back_on_sale() {
        let fx = fixture().await;
        let users = UsersService::new(fx.db.clone());
        let bookings = BookingsService::new(fx.db.clone());

        let show = fx
            .shows
            .schedule_show(fx.new_show(0, at(13, 18, 0), 2))
            .await
            .unwrap();
        let seats: Vec<_> = fx
            .shows
            .available_seats(show.id)
            .await
            .unwrap()
            .into_iter()
            .map(|seat| seat.show_seat_id)
            .collect();

        let ada = users
            .create_user("Ada".to_string(), "ada@example.com".to_string())
            .await
            .unwrap();
        let held = bookings
            .reserve_seats(ada.id, show.id, &seats[..1])
            .await
            .unwrap();
        let paid = bookings
            .reserve_seats(ada.id, show.id, &seats[1..2])
            .await
            .unwrap();
        bookings
            .confirm_booking(paid.id, PaymentMethod::Cash, 0.0)
            .await
            .unwrap();

        users.delete_user(ada.id).await.expect("Failed to delete user");

        assert!(matches!(
            bookings.get_booking(held.id).await,
            Err(BookingsServiceError::BookingNotFound)
        ));
        assert_eq!(Ticket::find().count(&fx.db).await.unwrap(), 0);

        let seat_map = fx.shows.seat_map(show.id).await.unwrap();
        assert_eq!(seat_map.len(), 4);
        assert!(seat_map
            .iter()
            .all(|seat| seat.status == ShowSeatStatus::Available));
    }
}
