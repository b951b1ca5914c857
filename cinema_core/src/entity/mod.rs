// SeaORM entities
// One module per table created by `models::migrator`.

pub mod booking;
pub mod cinema;
pub mod film;
pub mod menu_item;
pub mod payment;
pub mod role;
pub mod sea_orm_active_enums;
pub mod show;
pub mod show_seat;
pub mod showroom;
pub mod showroom_seat;
pub mod ticket;
pub mod user;

pub use sea_orm_active_enums::{BookingStatus, PaymentMethod, SeatType, ShowSeatStatus};


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::booking::{
        ActiveModel as BookingActiveModel, Column as BookingColumn, Entity as Booking,
        Model as BookingModel,
    };
    pub use super::cinema::{
        ActiveModel as CinemaActiveModel, Column as CinemaColumn, Entity as Cinema,
        Model as CinemaModel,
    };
    pub use super::film::{
        ActiveModel as FilmActiveModel, Column as FilmColumn, Entity as Film, Model as FilmModel,
    };
    pub use super::menu_item::{
        ActiveModel as MenuItemActiveModel, Column as MenuItemColumn, Entity as MenuItem,
        Model as MenuItemModel,
    };
    pub use super::payment::{
        ActiveModel as PaymentActiveModel, Column as PaymentColumn, Entity as Payment,
        Model as PaymentModel,
    };
    pub use super::role::{
        ActiveModel as RoleActiveModel, Column as RoleColumn, Entity as Role, Model as RoleModel,
    };
    pub use super::show::{
        ActiveModel as ShowActiveModel, Column as ShowColumn, Entity as Show, Model as ShowModel,
    };
    pub use super::show_seat::{
        ActiveModel as ShowSeatActiveModel, Column as ShowSeatColumn, Entity as ShowSeat,
        Model as ShowSeatModel,
    };
    pub use super::showroom::{
        ActiveModel as ShowroomActiveModel, Column as ShowroomColumn, Entity as Showroom,
        Model as ShowroomModel,
    };
    pub use super::showroom_seat::{
        ActiveModel as ShowroomSeatActiveModel, Column as ShowroomSeatColumn,
        Entity as ShowroomSeat, Model as ShowroomSeatModel,
    };
    pub use super::ticket::{
        ActiveModel as TicketActiveModel, Column as TicketColumn, Entity as Ticket,
        Model as TicketModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
    };
    pub use super::sea_orm_active_enums::{BookingStatus, PaymentMethod, SeatType, ShowSeatStatus};

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        DatabaseConnection,
        DatabaseTransaction,
        // Common result types
        DbErr,

        // Core traits
        EntityTrait,
        ModelTrait,
        NotSet,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        // Active model helpers
        Set,
        TransactionTrait,
    };
}
