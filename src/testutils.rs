use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use uuid::Uuid;

use crate::{
    backend::{BackendError, BackendResult, ClinicBackend},
    local_backend::LocalBackend,
    types::{Booking, BookingOutcome, Doctor, NewBooking, Payment, Role, Treatment, User},
};

pub struct MockClinicBackendInner {
    pub success: AtomicBool,
    pub calls_to_treatments: AtomicU64,
    pub calls_to_bookings_on: AtomicU64,
    pub calls_to_bookings_of: AtomicU64,
    pub calls_to_insert_booking: AtomicU64,
    pub calls_to_mark_booking_paid: AtomicU64,
    pub calls_to_set_role: AtomicU64,
    pub calls_to_add_doctor: AtomicU64,
    pub store: LocalBackend,
}

/// Counts calls and optionally fails them; data lives in an in-memory store
/// holding two treatments, "Cleaning" and "Whitening", with slots 9am to 11am.
#[derive(Clone)]
pub struct MockClinicBackend(pub Arc<MockClinicBackendInner>);

impl MockClinicBackendInner {
    fn new() -> Self {
        let slots: Vec<String> = vec!["9am".into(), "10am".into(), "11am".into()];
        Self {
            success: AtomicBool::new(true),
            calls_to_treatments: AtomicU64::default(),
            calls_to_bookings_on: AtomicU64::default(),
            calls_to_bookings_of: AtomicU64::default(),
            calls_to_insert_booking: AtomicU64::default(),
            calls_to_mark_booking_paid: AtomicU64::default(),
            calls_to_set_role: AtomicU64::default(),
            calls_to_add_doctor: AtomicU64::default(),
            store: LocalBackend::with_treatments(vec![
                Treatment {
                    name: "Cleaning".into(),
                    slots: slots.clone(),
                    price: 45.0,
                },
                Treatment {
                    name: "Whitening".into(),
                    slots,
                    price: 60.0,
                },
            ]),
        }
    }
}

impl MockClinicBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockClinicBackendInner::new()))
    }

    fn result(&self) -> BackendResult<()> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::Database("Supposed to fail".into())),
        }
    }

    fn count(&self, counter: &AtomicU64) -> BackendResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        self.result()
    }
}

impl ClinicBackend for MockClinicBackend {
    fn treatments(&self) -> BackendResult<Vec<Treatment>> {
        self.count(&self.0.calls_to_treatments)?;
        self.0.store.treatments()
    }

    fn treatment(&self, name: &str) -> BackendResult<Option<Treatment>> {
        self.result()?;
        self.0.store.treatment(name)
    }

    fn bookings_on(&self, date: &str) -> BackendResult<Vec<Booking>> {
        self.count(&self.0.calls_to_bookings_on)?;
        self.0.store.bookings_on(date)
    }

    fn bookings_of(&self, patient_email: &str) -> BackendResult<Vec<Booking>> {
        self.count(&self.0.calls_to_bookings_of)?;
        self.0.store.bookings_of(patient_email)
    }

    fn booking(&self, id: Uuid) -> BackendResult<Option<Booking>> {
        self.result()?;
        self.0.store.booking(id)
    }

    fn insert_booking(&self, booking: NewBooking) -> BackendResult<BookingOutcome> {
        self.count(&self.0.calls_to_insert_booking)?;
        self.0.store.insert_booking(booking)
    }

    fn mark_booking_paid(&self, id: Uuid, transaction_id: String) -> BackendResult<Booking> {
        self.count(&self.0.calls_to_mark_booking_paid)?;
        self.0.store.mark_booking_paid(id, transaction_id)
    }

    fn payments_of(&self, booking_id: Uuid) -> BackendResult<Vec<Payment>> {
        self.result()?;
        self.0.store.payments_of(booking_id)
    }

    fn upsert_user(&self, email: &str, name: Option<String>) -> BackendResult<User> {
        self.result()?;
        self.0.store.upsert_user(email, name)
    }

    fn user(&self, email: &str) -> BackendResult<Option<User>> {
        self.result()?;
        self.0.store.user(email)
    }

    fn users(&self) -> BackendResult<Vec<User>> {
        self.result()?;
        self.0.store.users()
    }

    fn set_role(&self, email: &str, role: Role) -> BackendResult<User> {
        self.count(&self.0.calls_to_set_role)?;
        self.0.store.set_role(email, role)
    }

    fn doctors(&self) -> BackendResult<Vec<Doctor>> {
        self.result()?;
        self.0.store.doctors()
    }

    fn add_doctor(&self, doctor: Doctor) -> BackendResult<()> {
        self.count(&self.0.calls_to_add_doctor)?;
        self.0.store.add_doctor(doctor)
    }

    fn remove_doctor(&self, email: &str) -> BackendResult<()> {
        self.result()?;
        self.0.store.remove_doctor(email)
    }
}
