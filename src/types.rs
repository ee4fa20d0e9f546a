use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable service with its fixed daily slot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub name: String,
    pub slots: Vec<String>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSummary {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub treatment_name: String,
    pub date: String,
    pub slot: String,
    pub patient_email: String,
    pub patient_name: String,
    pub paid: bool,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub treatment_name: String,
    pub date: String,
    pub slot: String,
    pub patient_email: String,
    pub patient_name: String,
}

impl NewBooking {
    /// Whether `booking` occupies the same (treatment, date, patient) triplet.
    pub fn collides_with(&self, booking: &Booking) -> bool {
        self.treatment_name == booking.treatment_name
            && self.date == booking.date
            && self.patient_email == booking.patient_email
    }

    pub fn into_booking(self, id: Uuid) -> Booking {
        Booking {
            id,
            treatment_name: self.treatment_name,
            date: self.date,
            slot: self.slot,
            patient_email: self.patient_email,
            patient_name: self.patient_name,
            paid: false,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Inserted(Booking),
    Duplicate(Booking),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub email: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub booking_id: Uuid,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}
