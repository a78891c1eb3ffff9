use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    accounts::{
        dto::{
            DriverRegisterRequest, LoginData, LoginRequest, ResendOtpRequest, RiderRegisterRequest,
            VerifyOtpRequest,
        },
        repo_types::{Account, Admin, Driver, DriverProfile, Rider, RiderProfile},
        services, AccountKind,
    },
    auth::{AuthUser, JwtKeys},
    error::AppResult,
    extract::Json,
    response::{ok, ok_with, Empty, Envelope},
    state::AppState,
    validation::IdQuery,
};

pub fn rider_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_rider))
        .merge(account_routes::<Rider>())
}

pub fn driver_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_driver))
        .merge(account_routes::<Driver>())
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/login", post(login::<Admin>))
}

fn account_routes<A: AccountKind>() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::<A>))
        .route("/list", get(list::<A>))
        .route("/", get(detail::<A>))
        .route("/verify-otp", post(verify_otp::<A>))
        .route("/resend-verify-otp", post(resend_otp::<A>))
}

#[instrument(skip(state, payload))]
pub async fn register_rider(
    State(state): State<AppState>,
    Json(payload): Json<RiderRegisterRequest>,
) -> AppResult<Envelope<RiderProfile>> {
    let rider = services::register_rider(
        state.riders.as_ref(),
        state.mailer.as_ref(),
        &state.config.smtp.from,
        payload,
    )
    .await?;
    Ok(ok_with("Registration Success.", rider.profile()))
}

#[instrument(skip(state, payload))]
pub async fn register_driver(
    State(state): State<AppState>,
    Json(payload): Json<DriverRegisterRequest>,
) -> AppResult<Envelope<DriverProfile>> {
    let driver = services::register_driver(
        state.drivers.as_ref(),
        state.mailer.as_ref(),
        &state.config.smtp.from,
        payload,
    )
    .await?;
    Ok(ok_with("Driver Registration Success.", driver.profile()))
}

#[instrument(skip(state, payload))]
pub async fn login<A: AccountKind>(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Envelope<LoginData<A::Profile>>> {
    let keys = JwtKeys::from_ref(&state);
    let data = services::login(A::repo(&state), &keys, payload).await?;
    Ok(ok_with("Login Success.", data))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp<A: AccountKind>(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Envelope<()>> {
    services::verify_otp(A::repo(&state), payload).await?;
    Ok(ok("Account confirmed success."))
}

#[instrument(skip(state, payload))]
pub async fn resend_otp<A: AccountKind>(
    State(state): State<AppState>,
    Json(payload): Json<ResendOtpRequest>,
) -> AppResult<Envelope<()>> {
    services::resend_otp(
        A::repo(&state),
        state.mailer.as_ref(),
        &state.config.smtp.from,
        payload,
    )
    .await?;
    Ok(ok("Confirm otp sent."))
}

/// Admin only.
#[instrument(skip(state))]
pub async fn list<A: AccountKind>(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Envelope<Vec<A::Profile>>> {
    services::require_admin(state.admins.as_ref(), user).await?;
    let profiles = services::list(A::repo(&state)).await?;
    Ok(ok_with("Operation success", profiles))
}

#[instrument(skip(state))]
pub async fn detail<A: AccountKind>(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<IdQuery>,
) -> AppResult<Response> {
    Ok(match services::detail(A::repo(&state), q.id.as_deref()).await? {
        Some(profile) => ok_with("Operation success", profile).into_response(),
        None => ok_with("No Record Found", Empty {}).into_response(),
    })
}
