use crate::types::{Booking, BookingOutcome, Doctor, NewBooking, Payment, Role, Treatment, User};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage seam of the portal. Handlers only ever see this trait, so the
/// PostgreSQL store, the in-memory store and test doubles are interchangeable.
pub trait ClinicBackend: Clone + Send + Sync + 'static {
    fn treatments(&self) -> BackendResult<Vec<Treatment>>;
    fn treatment(&self, name: &str) -> BackendResult<Option<Treatment>>;

    fn bookings_on(&self, date: &str) -> BackendResult<Vec<Booking>>;
    fn bookings_of(&self, patient_email: &str) -> BackendResult<Vec<Booking>>;
    fn booking(&self, id: Uuid) -> BackendResult<Option<Booking>>;
    /// Inserts unless a booking with the same treatment, date and patient
    /// exists, in which case that booking is returned untouched.
    fn insert_booking(&self, booking: NewBooking) -> BackendResult<BookingOutcome>;
    fn mark_booking_paid(&self, id: Uuid, transaction_id: String) -> BackendResult<Booking>;
    fn payments_of(&self, booking_id: Uuid) -> BackendResult<Vec<Payment>>;

    fn upsert_user(&self, email: &str, name: Option<String>) -> BackendResult<User>;
    fn user(&self, email: &str) -> BackendResult<Option<User>>;
    fn users(&self) -> BackendResult<Vec<User>>;
    fn set_role(&self, email: &str, role: Role) -> BackendResult<User>;

    fn doctors(&self) -> BackendResult<Vec<Doctor>>;
    fn add_doctor(&self, doctor: Doctor) -> BackendResult<()>;
    fn remove_doctor(&self, email: &str) -> BackendResult<()>;
}
