//! Domain models for hotel-service.

mod agent;
mod blog;
mod contact;
mod customer;
mod faq;
mod invoice;
mod payment;
mod reservation;
mod room;
mod stats;

pub use agent::{Agent, CreateAgent, UpdateAgent};
pub use blog::{slugify, Blog, CreateBlog, UpdateBlog};
pub use contact::{Contact, CreateContact};
pub use customer::{CreateCustomer, Customer, UpdateCustomer};
pub use faq::{CreateFaq, Faq, UpdateFaq};
pub use invoice::{Invoice, InvoiceStatus, ListInvoicesFilter};
pub use payment::{NewPayment, Payment, PaymentMode};
pub use reservation::{
    BookingRequest, ListReservationsFilter, Reservation, ReservationDetails, ReservationStatus,
};
pub use room::{CreateRoom, Room, RoomType, UpdateRoom};
pub use stats::{HotelStats, StatusCount};
