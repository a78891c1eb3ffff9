use time::{macros::format_description, Date};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    accounts::{
        repo::AccountRepo,
        repo_types::{Driver, Filter, Rider},
        services::current,
    },
    auth::AuthUser,
    bookings::{
        dto::{AssignDriverRequest, CreateBookingRequest},
        repo::BookingRepo,
        repo_types::{Assignment, Booking, BookingWithParties},
    },
    error::{AppError, AppResult},
    validation::{parse_id, Checks},
};

pub const RIDERS_ONLY: &str = "Only riders can create bookings.";
pub const NOT_OWNER: &str = "You are not authorized to do this operation.";
pub const BOOKING_MISSING: &str = "Booking not exists with this id";
pub const DRIVER_MISSING: &str = "Driver not exists with this id";
pub const ALREADY_BOOKED: &str = "Booking is already booked.";
pub const DRIVER_BUSY: &str = "Driver is not available.";

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub async fn create(
    riders: &dyn AccountRepo<Rider>,
    bookings: &dyn BookingRepo,
    user: AuthUser,
    req: CreateBookingRequest,
) -> AppResult<Booking> {
    let mut checks = Checks::new();
    checks.required("date", &req.date, "Date must not be empty.");
    let date = parse_date(&req.date);
    if date.is_none() {
        checks.push("date", "Date must be formatted as YYYY-MM-DD.");
    }
    checks.required("time", &req.time, "Time must not be empty.");
    checks.required("pickFrom", &req.pick_from, "Pick From must not be empty");
    checks.required("destination", &req.destination, "Destination must not be empty");
    checks.required("noOfPassengers", &req.no_of_passengers, "noOfPassengers must not be empty");
    let passengers = checks.positive_int(
        "noOfPassengers",
        &req.no_of_passengers,
        "noOfPassengers must be a positive number",
    );
    checks.required("vehicleType", &req.vehicle_type, "Vehicle Type must not be empty");
    checks.finish()?;

    let rider = current(riders, user, RIDERS_ONLY).await?;

    let (Some(date), Some(passengers)) = (date, passengers) else {
        return Err(AppError::invalid("date", "Date must not be empty."));
    };
    let booking = Booking::pending(
        rider.state.id,
        date,
        req.time.trim().to_string(),
        req.pick_from.trim().to_string(),
        req.destination.trim().to_string(),
        passengers,
        req.vehicle_type.trim().to_string(),
    );
    bookings.insert(&booking).await?;
    info!(booking_id = %booking.id, rider_id = %rider.state.id, "booking created");
    Ok(booking)
}

/// Guarded `Pending -> Booked` transition.
pub async fn assign_driver(
    drivers: &dyn AccountRepo<Driver>,
    bookings: &dyn BookingRepo,
    req: AssignDriverRequest,
) -> AppResult<Booking> {
    let mut checks = Checks::new();
    checks.required("driverID", &req.driver_id, "Driver ID must not be empty.");
    let driver_id = parse_id(&req.driver_id);
    if driver_id.is_none() {
        checks.push("driverID", "Driver ID is invalid.");
    }
    checks.required("bookingID", &req.booking_id, "Booking ID must not be empty");
    let booking_id = parse_id(&req.booking_id);
    if booking_id.is_none() {
        checks.push("bookingID", "Booking ID is invalid.");
    }
    checks.finish()?;
    let (Some(driver_id), Some(booking_id)) = (driver_id, booking_id) else {
        return Err(AppError::invalid("bookingID", "Booking ID is invalid."));
    };

    let Some(driver) = drivers.find_one(Filter::Id(driver_id)).await? else {
        return Err(AppError::not_found(DRIVER_MISSING));
    };
    if !driver.state.is_confirmed || !driver.state.status {
        warn!(%driver_id, "driver not confirmed or inactive");
        return Err(AppError::conflict(DRIVER_BUSY));
    }

    match bookings.assign_driver(booking_id, driver_id).await? {
        Assignment::Assigned(b) => {
            info!(%booking_id, %driver_id, "booking confirmed");
            Ok(b)
        }
        Assignment::BookingMissing => Err(AppError::not_found(BOOKING_MISSING)),
        Assignment::AlreadyBooked => {
            warn!(%booking_id, %driver_id, "booking already booked");
            Err(AppError::conflict(ALREADY_BOOKED))
        }
        Assignment::DriverBusy => {
            warn!(%booking_id, %driver_id, "driver slot taken");
            Err(AppError::conflict(DRIVER_BUSY))
        }
    }
}

pub async fn list(bookings: &dyn BookingRepo) -> AppResult<Vec<BookingWithParties>> {
    Ok(bookings.list_with_parties().await?)
}

/// Malformed ids behave like unknown ones.
pub async fn detail(bookings: &dyn BookingRepo, raw_id: Option<&str>) -> AppResult<Option<Booking>> {
    let Some(id) = raw_id.and_then(parse_id) else {
        return Ok(None);
    };
    Ok(bookings.find_by_id(id).await?)
}

/// Only the owning rider may delete. Ownership is checked against the stored
/// booking, never against token contents.
pub async fn delete(
    riders: &dyn AccountRepo<Rider>,
    bookings: &dyn BookingRepo,
    user: AuthUser,
    raw_id: &str,
) -> AppResult<()> {
    let id: Uuid = parse_id(raw_id).ok_or_else(|| AppError::invalid("id", "Invalid ID"))?;
    let Some(booking) = bookings.find_by_id(id).await? else {
        return Err(AppError::not_found(BOOKING_MISSING));
    };
    let rider = current(riders, user, NOT_OWNER).await?;
    if booking.rider_id != rider.state.id {
        warn!(booking_id = %id, user_id = %user.id, "delete by non-owner");
        return Err(AppError::unauthorized(NOT_OWNER));
    }
    if !bookings.delete_by_id(id).await? {
        return Err(AppError::not_found(BOOKING_MISSING));
    }
    info!(booking_id = %id, "booking deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        accounts::{
            repo::memory::MemoryAccounts,
            repo_types::{AccountState, Role},
        },
        bookings::{repo::memory::MemoryBookings, repo_types::BookingStatus},
    };

    fn confirmed(email: &str) -> AccountState {
        let mut state = AccountState::unconfirmed(email.into(), "hash".into(), "1234".into());
        state.is_confirmed = true;
        state.confirm_otp = None;
        state
    }

    struct Fixture {
        riders: Arc<MemoryAccounts<Rider>>,
        drivers: Arc<MemoryAccounts<Driver>>,
        bookings: MemoryBookings,
    }

    impl Fixture {
        fn new() -> Self {
            let riders = Arc::new(MemoryAccounts::default());
            let drivers = Arc::new(MemoryAccounts::default());
            let bookings = MemoryBookings::new(riders.clone(), drivers.clone());
            Self {
                riders,
                drivers,
                bookings,
            }
        }

        async fn rider(&self, email: &str) -> AuthUser {
            let rider = Rider {
                state: confirmed(email),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                phone_number: None,
            };
            self.riders.insert(&rider).await.unwrap();
            AuthUser {
                id: rider.state.id,
                role: Role::Rider,
            }
        }

        async fn driver(&self, email: &str, license: &str) -> Uuid {
            let driver = Driver {
                state: confirmed(email),
                first_name: "Dan".into(),
                last_name: "Driver".into(),
                age: 40,
                phone_number: "5550101".into(),
                license_number: license.into(),
                car_number: "KA01".into(),
                car_model: "Corolla".into(),
                car_type: "Sedan".into(),
                company_made: "Toyota".into(),
            };
            self.drivers.insert(&driver).await.unwrap();
            driver.state.id
        }

        async fn book(&self, user: AuthUser, time: &str) -> Booking {
            create(self.riders.as_ref(), &self.bookings, user, booking_req(time))
                .await
                .unwrap()
        }

        async fn assign(&self, booking: Uuid, driver: Uuid) -> AppResult<Booking> {
            let req = serde_json::from_value(json!({
                "bookingID": booking.to_string(),
                "driverID": driver.to_string(),
            }))
            .unwrap();
            assign_driver(self.drivers.as_ref(), &self.bookings, req).await
        }
    }

    fn booking_req(time: &str) -> CreateBookingRequest {
        serde_json::from_value(json!({
            "date": "2024-05-01",
            "time": time,
            "pickFrom": " Airport ",
            "destination": "Downtown",
            "noOfPessengers": 2,
            "vehicleType": "Sedan",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_stores_pending_booking_for_the_rider() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let booking = fx.book(user, "10:00").await;

        assert_eq!(booking.rider_id, user.id);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.driver_id, None);
        assert_eq!(booking.passengers, 2);
        assert_eq!(booking.pick_from, "Airport");
        assert!(fx.bookings.get(booking.id).is_some());
    }

    #[tokio::test]
    async fn create_validates_every_field() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let req = serde_json::from_value(json!({ "date": "01/05/2024", "noOfPassengers": 0 })).unwrap();
        let err = create(fx.riders.as_ref(), &fx.bookings, user, req).await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["date", "time", "pickFrom", "destination", "noOfPassengers", "vehicleType"]
        );
        assert_eq!(errors[1].message, "Time must not be empty.");
    }

    #[tokio::test]
    async fn only_riders_create_bookings() {
        let fx = Fixture::new();
        let driver = fx.driver("dan@example.com", "LIC-1").await;
        let as_driver = AuthUser {
            id: driver,
            role: Role::Driver,
        };
        let err = create(fx.riders.as_ref(), &fx.bookings, as_driver, booking_req("10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn assignment_confirms_once() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let first = fx.driver("d1@example.com", "LIC-1").await;
        let second = fx.driver("d2@example.com", "LIC-2").await;
        let booking = fx.book(user, "10:00").await;

        let booked = fx.assign(booking.id, first).await.unwrap();
        assert_eq!(booked.status, BookingStatus::Booked);
        assert_eq!(booked.driver_id, Some(first));

        let err = fx.assign(booking.id, second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == ALREADY_BOOKED));
        assert_eq!(fx.bookings.get(booking.id).unwrap().driver_id, Some(first));
    }

    #[tokio::test]
    async fn busy_driver_is_refused() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let driver = fx.driver("d1@example.com", "LIC-1").await;
        let a = fx.book(user, "10:00").await;
        let b = fx.book(user, "10:00").await;

        fx.assign(a.id, driver).await.unwrap();
        let err = fx.assign(b.id, driver).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == DRIVER_BUSY));
        assert_eq!(fx.bookings.get(b.id).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn assignment_needs_an_available_driver() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let booking = fx.book(user, "10:00").await;

        let err = fx.assign(booking.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == DRIVER_MISSING));

        let driver = fx.driver("d1@example.com", "LIC-1").await;
        fx.drivers.update(driver, |d| d.state.status = false);
        let err = fx.assign(booking.id, driver).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        fx.drivers.update(driver, |d| d.state.status = true);
        let err = fx.assign(Uuid::new_v4(), driver).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == BOOKING_MISSING));
    }

    #[tokio::test]
    async fn assignment_rejects_malformed_ids() {
        let fx = Fixture::new();
        let req = serde_json::from_value(json!({ "bookingID": "abc" })).unwrap();
        let err = assign_driver(fx.drivers.as_ref(), &fx.bookings, req).await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "driverID");
        assert_eq!(errors[1].message, "Booking ID is invalid.");
    }

    #[tokio::test]
    async fn only_the_owner_deletes() {
        let fx = Fixture::new();
        let owner = fx.rider("ada@example.com").await;
        let other = fx.rider("bob@example.com").await;
        let booking = fx.book(owner, "10:00").await;
        let id = booking.id.to_string();

        let err = delete(fx.riders.as_ref(), &fx.bookings, other, &id).await.unwrap_err();
        assert_eq!(err.to_string(), NOT_OWNER);
        assert!(fx.bookings.get(booking.id).is_some());

        delete(fx.riders.as_ref(), &fx.bookings, owner, &id).await.unwrap();
        assert!(fx.bookings.get(booking.id).is_none());

        let err = delete(fx.riders.as_ref(), &fx.bookings, owner, &id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete(fx.riders.as_ref(), &fx.bookings, owner, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn detail_finds_by_id() {
        let fx = Fixture::new();
        let user = fx.rider("ada@example.com").await;
        let booking = fx.book(user, "10:00").await;
        let id = booking.id.to_string();
        assert_eq!(detail(&fx.bookings, Some(&id)).await.unwrap().map(|b| b.id), Some(booking.id));
        assert!(detail(&fx.bookings, Some("bogus")).await.unwrap().is_none());
        assert_eq!(list(&fx.bookings).await.unwrap().len(), 1);
    }
}
