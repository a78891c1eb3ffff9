use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Booking lifecycle. The only transition is `Pending -> Booked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status")]
pub enum BookingStatus {
    Pending,
    Booked,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub rider_id: Uuid,
    #[serde(rename = "driverID")]
    pub driver_id: Option<Uuid>,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time: String,
    pub pick_from: String,
    pub destination: String,
    #[serde(rename = "noOfPassengers")]
    pub passengers: i32,
    pub vehicle_type: String,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Booking {
    pub fn pending(
        rider_id: Uuid,
        date: Date,
        time: String,
        pick_from: String,
        destination: String,
        passengers: i32,
        vehicle_type: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rider_id,
            driver_id: None,
            date,
            time,
            pick_from,
            destination,
            passengers,
            vehicle_type,
            status: BookingStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Whether both bookings occupy the same driver slot.
    #[cfg(test)]
    pub fn same_slot(&self, other: &Booking) -> bool {
        self.date == other.date && self.time == other.time
    }
}

/// Name and phone of a party joined into booking listings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithParties {
    #[serde(flatten)]
    pub booking: Booking,
    pub rider: Option<Party>,
    pub driver: Option<Party>,
}

/// Result of the guarded `Pending -> Booked` transition.
#[derive(Debug, Clone)]
pub enum Assignment {
    Assigned(Booking),
    BookingMissing,
    AlreadyBooked,
    DriverBusy,
}
