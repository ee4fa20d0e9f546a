use crate::backend::{BackendResult, ClinicBackend};
use crate::types::{Booking, Treatment};
use std::collections::HashSet;
use tracing::debug;

/// Loads every treatment and the bookings of `date`, then strips the booked slots.
pub fn availability<B: ClinicBackend>(backend: &B, date: &str) -> BackendResult<Vec<Treatment>> {
    let treatments = backend.treatments()?;
    let bookings = backend.bookings_on(date)?;
    debug!(
        date,
        treatments = treatments.len(),
        bookings = bookings.len(),
        "Computing availability"
    );
    Ok(remove_booked_slots(treatments, &bookings))
}

/// Keeps every treatment, fully booked ones included, and preserves slot order.
pub fn remove_booked_slots(mut treatments: Vec<Treatment>, bookings: &[Booking]) -> Vec<Treatment> {
    for treatment in treatments.iter_mut() {
        let booked: HashSet<&str> = bookings
            .iter()
            .filter(|booking| booking.treatment_name == treatment.name)
            .map(|booking| booking.slot.as_str())
            .collect();
        treatment.slots.retain(|slot| !booked.contains(slot.as_str()));
    }
    treatments
}
