use crate::backend::{BackendError, BackendResult, ClinicBackend};
use crate::types::{Booking, BookingOutcome, Doctor, NewBooking, Payment, Role, Treatment, User};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct ClinicState {
    treatments: Vec<Treatment>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    users: HashMap<String, User>,
    doctors: Vec<Doctor>,
}

/// Impersistent backend used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    state: Arc<Mutex<ClinicState>>,
}

impl LocalBackend {
    pub fn with_treatments(treatments: Vec<Treatment>) -> LocalBackend {
        let backend = LocalBackend::default();
        if let Ok(mut state) = backend.state.lock() {
            state.treatments = treatments;
        }
        backend
    }

    pub fn with_example_treatments() -> LocalBackend {
        const EXAMPLES: [(&str, f64); 6] = [
            ("Teeth Orthodontics", 45.0),
            ("Cosmetic Dentistry", 55.0),
            ("Teeth Cleaning", 30.0),
            ("Cavity Protection", 40.0),
            ("Pediatric Dental", 35.0),
            ("Oral Surgery", 80.0),
        ];
        let slots: Vec<String> = [
            "08.00 AM - 08.30 AM",
            "08.30 AM - 09.00 AM",
            "09.00 AM - 09.30 AM",
            "09.30 AM - 10.00 AM",
            "10.00 AM - 10.30 AM",
            "10.30 AM - 11.00 AM",
            "11.00 AM - 11.30 AM",
            "11.30 AM - 12.00 PM",
        ]
        .iter()
        .map(|slot| slot.to_string())
        .collect();

        info!("Seeding {} example treatments", EXAMPLES.len());
        LocalBackend::with_treatments(
            EXAMPLES
                .iter()
                .map(|(name, price)| Treatment {
                    name: name.to_string(),
                    slots: slots.clone(),
                    price: *price,
                })
                .collect(),
        )
    }

    fn state(&self) -> BackendResult<MutexGuard<'_, ClinicState>> {
        self.state.lock().map_err(|err| {
            error!(%err, "Clinic state lock poisoned");
            BackendError::Database("In-memory store is unavailable".into())
        })
    }
}

impl ClinicBackend for LocalBackend {
    fn treatments(&self) -> BackendResult<Vec<Treatment>> {
        Ok(self.state()?.treatments.clone())
    }

    fn treatment(&self, name: &str) -> BackendResult<Option<Treatment>> {
        Ok(self
            .state()?
            .treatments
            .iter()
            .find(|treatment| treatment.name == name)
            .cloned())
    }

    fn bookings_on(&self, date: &str) -> BackendResult<Vec<Booking>> {
        Ok(self
            .state()?
            .bookings
            .iter()
            .filter(|booking| booking.date == date)
            .cloned()
            .collect())
    }

    fn bookings_of(&self, patient_email: &str) -> BackendResult<Vec<Booking>> {
        Ok(self
            .state()?
            .bookings
            .iter()
            .filter(|booking| booking.patient_email == patient_email)
            .cloned()
            .collect())
    }

    fn booking(&self, id: Uuid) -> BackendResult<Option<Booking>> {
        Ok(self
            .state()?
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }

    fn insert_booking(&self, booking: NewBooking) -> BackendResult<BookingOutcome> {
        // Check and insert under one lock.
        let mut state = self.state()?;
        if let Some(existing) = state.bookings.iter().find(|b| booking.collides_with(b)) {
            return Ok(BookingOutcome::Duplicate(existing.clone()));
        }
        let booking = booking.into_booking(Uuid::new_v4());
        state.bookings.push(booking.clone());
        Ok(BookingOutcome::Inserted(booking))
    }

    fn mark_booking_paid(&self, id: Uuid, transaction_id: String) -> BackendResult<Booking> {
        let mut state = self.state()?;
        let booking = state
            .bookings
            .iter_mut()
            .find(|booking| booking.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Booking {id}")))?;
        booking.paid = true;
        booking.transaction_id = Some(transaction_id.clone());
        let booking = booking.clone();

        state.payments.push(Payment {
            booking_id: id,
            transaction_id,
            created_at: Utc::now(),
        });
        Ok(booking)
    }

    fn payments_of(&self, booking_id: Uuid) -> BackendResult<Vec<Payment>> {
        Ok(self
            .state()?
            .payments
            .iter()
            .filter(|payment| payment.booking_id == booking_id)
            .cloned()
            .collect())
    }

    fn upsert_user(&self, email: &str, name: Option<String>) -> BackendResult<User> {
        let mut state = self.state()?;
        let user = state.users.entry(email.to_string()).or_insert_with(|| User {
            email: email.to_string(),
            name: None,
            role: None,
        });
        if name.is_some() {
            user.name = name;
        }
        Ok(user.clone())
    }

    fn user(&self, email: &str) -> BackendResult<Option<User>> {
        Ok(self.state()?.users.get(email).cloned())
    }

    fn users(&self) -> BackendResult<Vec<User>> {
        let mut users: Vec<User> = self.state()?.users.values().cloned().collect();
        users.sort_unstable_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    fn set_role(&self, email: &str, role: Role) -> BackendResult<User> {
        let mut state = self.state()?;
        let user = state.users.entry(email.to_string()).or_insert_with(|| User {
            email: email.to_string(),
            name: None,
            role: None,
        });
        user.role = Some(role);
        Ok(user.clone())
    }

    fn doctors(&self) -> BackendResult<Vec<Doctor>> {
        Ok(self.state()?.doctors.clone())
    }

    fn add_doctor(&self, doctor: Doctor) -> BackendResult<()> {
        let mut state = self.state()?;
        if state.doctors.iter().any(|known| known.email == doctor.email) {
            let err = format!("Doctor {}", doctor.email);
            error!(%err, "Doctor is already registered");
            return Err(BackendError::Conflict(err));
        }
        state.doctors.push(doctor);
        Ok(())
    }

    fn remove_doctor(&self, email: &str) -> BackendResult<()> {
        let mut state = self.state()?;
        let count = state.doctors.len();
        state.doctors.retain(|doctor| doctor.email != email);
        if state.doctors.len() == count {
            let err = format!("Doctor {email}");
            error!(%err, "Doctor does not exist and can't therefore not be removed");
            return Err(BackendError::NotFound(err));
        }
        Ok(())
    }
}
