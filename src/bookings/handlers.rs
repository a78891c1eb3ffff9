use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    bookings::{
        dto::{AssignDriverRequest, CreateBookingRequest},
        repo_types::{Booking, BookingWithParties},
        services,
    },
    error::AppResult,
    extract::Json,
    response::{ok, ok_with, Empty, Envelope},
    state::AppState,
    validation::IdQuery,
};

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Envelope<Vec<BookingWithParties>>> {
    let bookings = services::list(state.bookings.as_ref()).await?;
    Ok(ok_with("Operation success", bookings))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<IdQuery>,
) -> AppResult<Response> {
    Ok(match services::detail(state.bookings.as_ref(), q.id.as_deref()).await? {
        Some(booking) => ok_with("Operation success", booking).into_response(),
        None => ok_with("No Record Found", Empty {}).into_response(),
    })
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Envelope<Booking>> {
    let booking =
        services::create(state.riders.as_ref(), state.bookings.as_ref(), user, payload).await?;
    Ok(ok_with("Booking add Success.", booking))
}

#[instrument(skip(state, payload))]
pub async fn assign_driver(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<AssignDriverRequest>,
) -> AppResult<Envelope<Booking>> {
    let booking =
        services::assign_driver(state.drivers.as_ref(), state.bookings.as_ref(), payload).await?;
    Ok(ok_with("Booking Confirmed", booking))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Envelope<()>> {
    services::delete(state.riders.as_ref(), state.bookings.as_ref(), user, &id).await?;
    Ok(ok("Booking delete Success."))
}
