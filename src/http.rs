use crate::availability::availability;
use crate::backend::ClinicBackend;
use crate::configuration::Configuration;
use crate::error::AppError;
use crate::payment::{PaymentProvider, StripePayments};
use crate::token::{Identity, TokenService};
use crate::types::{
    Booking, BookingOutcome, Doctor, NewBooking, Payment, Role, Treatment, TreatmentSummary,
    User,
};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct AppState<B: ClinicBackend> {
    pub backend: B,
    pub tokens: TokenService,
    pub payments: Arc<dyn PaymentProvider>,
}

impl<B: ClinicBackend> AppState<B> {
    pub fn new<C: Configuration>(backend: B, configuration: &C) -> Self {
        Self {
            backend,
            tokens: TokenService::new(
                &configuration.token_secret(),
                configuration.token_lifetime(),
            ),
            payments: Arc::new(StripePayments::new(
                configuration.payment_secret_key(),
                configuration.payment_api_url(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct BookingRequest {
    #[validate(length(min = 1))]
    treatment_name: String,
    #[validate(length(min = 1))]
    date: String,
    #[validate(length(min = 1))]
    slot: String,
    #[validate(email)]
    patient_email: String,
    #[serde(default)]
    patient_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookingResponse {
    success: bool,
    booking: Booking,
}

#[derive(Debug, Clone, Deserialize)]
struct AvailableQuery {
    date: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PatientQuery {
    email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayBookingRequest {
    transaction_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
struct EmailPath {
    #[validate(email)]
    email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserRequest {
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserResponse {
    user: User,
    token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct DoctorRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    specialty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct PaymentIntentRequest {
    #[validate(range(exclusive_min = 0.0))]
    price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
}

pub fn create_app<B: ClinicBackend>(state: AppState<B>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/", get(get_status))
        .route("/appointment", get(get_treatments::<B>))
        .route("/available", get(get_available::<B>))
        .route("/booking", post(add_booking::<B>))
        .route("/user/:email", put(put_user::<B>))
        .route("/admin/:email", get(get_admin::<B>));

    let patient = Router::new()
        .route("/booking", get(get_bookings::<B>))
        .route("/booking/:id", get(get_booking::<B>).patch(pay_booking::<B>))
        .route("/booking/:id/payments", get(get_payments::<B>))
        .route("/user", get(get_users::<B>))
        .route("/create-payment-intent", post(create_payment_intent::<B>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_token::<B>,
        ));

    // Layers run bottom-up: the token is verified before the role is checked.
    let admin = Router::new()
        .route("/user/admin/:email", put(make_admin::<B>))
        .route("/doctor", get(get_doctors::<B>).post(add_doctor::<B>))
        .route("/doctor/:email", delete(remove_doctor::<B>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin::<B>,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_token::<B>,
        ));

    Router::new()
        .merge(public)
        .merge(patient)
        .merge(admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn verify_token<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());
    let identity = state.tokens.verify_header(header)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Admin predicate shared by every admin-only route.
async fn require_admin<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Extension(identity): Extension<Identity>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_admin = state
        .backend
        .user(&identity.email)?
        .is_some_and(|user| user.is_admin());
    if !is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

async fn get_status() -> &'static str {
    "Clinic portal is running"
}

async fn get_treatments<B: ClinicBackend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<TreatmentSummary>>, AppError> {
    let treatments = state.backend.treatments()?;
    Ok(Json(
        treatments
            .into_iter()
            .map(|treatment| TreatmentSummary {
                name: treatment.name,
            })
            .collect(),
    ))
}

async fn get_available<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Vec<Treatment>>, AppError> {
    Ok(Json(availability(&state.backend, &query.date)?))
}

async fn get_bookings<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    if query.email != identity.email {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.backend.bookings_of(&query.email)?))
}

async fn get_booking<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    state
        .backend
        .booking(id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Booking {id}")))
}

async fn add_booking<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    request.validate()?;

    let treatment = state
        .backend
        .treatment(&request.treatment_name)?
        .ok_or_else(|| {
            AppError::Validation(format!("Unknown treatment {}", request.treatment_name))
        })?;
    if !treatment.slots.contains(&request.slot) {
        return Err(AppError::Validation(format!(
            "{} is not a slot of {}",
            request.slot, treatment.name
        )));
    }

    let outcome = state.backend.insert_booking(NewBooking {
        treatment_name: request.treatment_name,
        date: request.date,
        slot: request.slot,
        patient_email: request.patient_email,
        patient_name: request.patient_name,
    })?;

    let response = match outcome {
        BookingOutcome::Inserted(booking) => {
            info!(
                id = %booking.id,
                treatment = %booking.treatment_name,
                date = %booking.date,
                "Booking created"
            );
            BookingResponse {
                success: true,
                booking,
            }
        }
        BookingOutcome::Duplicate(booking) => BookingResponse {
            success: false,
            booking,
        },
    };
    Ok(Json(response))
}

async fn pay_booking<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    if request.transaction_id.is_empty() {
        return Err(AppError::Validation("transactionId must not be empty".into()));
    }
    let booking = state
        .backend
        .mark_booking_paid(id, request.transaction_id)?;
    info!(%id, "Booking paid");
    Ok(Json(booking))
}

async fn get_payments<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    if state.backend.booking(id)?.is_none() {
        return Err(AppError::NotFound(format!("Booking {id}")));
    }
    Ok(Json(state.backend.payments_of(id)?))
}

async fn put_user<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(path): Path<EmailPath>,
    request: Option<Json<UserRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    path.validate()?;
    let Json(request) = request.unwrap_or_default();

    let user = state.backend.upsert_user(&path.email, request.name)?;
    let token = state.tokens.issue(&user.email)?;
    Ok(Json(UserResponse { user, token }))
}

async fn get_users<B: ClinicBackend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.backend.users()?))
}

async fn make_admin<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    if state.backend.user(&email)?.is_none() {
        return Err(AppError::NotFound(format!("User {email}")));
    }
    let user = state.backend.set_role(&email, Role::Admin)?;
    info!(%email, "User promoted to admin");
    Ok(Json(user))
}

async fn get_admin<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let admin = state
        .backend
        .user(&email)?
        .is_some_and(|user| user.is_admin());
    Ok(Json(json!({ "admin": admin })))
}

async fn get_doctors<B: ClinicBackend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(state.backend.doctors()?))
}

async fn add_doctor<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<DoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    request.validate()?;
    let doctor = Doctor {
        name: request.name,
        email: request.email,
        specialty: request.specialty,
    };
    state.backend.add_doctor(doctor.clone())?;
    info!(email = %doctor.email, "Doctor added");
    Ok(Json(doctor))
}

async fn remove_doctor<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.backend.remove_doctor(&email)?;
    info!(%email, "Doctor removed");
    Ok(Json(json!({ "deleted": email })))
}

async fn create_payment_intent<B: ClinicBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    request.validate()?;
    let amount = (request.price * 100.0).round() as u64;

    let client_secret = state
        .payments
        .create_payment_intent(amount, CURRENCY)
        .await?;
    Ok(Json(PaymentIntentResponse { client_secret }))
}
