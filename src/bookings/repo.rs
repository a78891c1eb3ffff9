use anyhow::Context;
use axum::async_trait;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{Assignment, Booking, BookingStatus, BookingWithParties, Party};

#[async_trait]
pub trait BookingRepo: Send + Sync {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>>;

    /// Every booking with rider and driver contact details, newest first.
    async fn list_with_parties(&self) -> anyhow::Result<Vec<BookingWithParties>>;

    /// Atomically moves a `Pending` booking to `Booked` for `driver_id`,
    /// unless the driver already holds a booking in the same slot.
    async fn assign_driver(&self, booking_id: Uuid, driver_id: Uuid) -> anyhow::Result<Assignment>;

    /// Returns whether a booking was removed.
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool>;
}

const BOOKING_COLUMNS: &str = "id, rider_id, driver_id, date, time, pick_from, destination, \
     passengers, vehicle_type, status, created_at";

pub struct PgBookings {
    db: PgPool,
}

impl PgBookings {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct BookingPartiesRow {
    id: Uuid,
    rider_id: Uuid,
    driver_id: Option<Uuid>,
    date: Date,
    time: String,
    pick_from: String,
    destination: String,
    passengers: i32,
    vehicle_type: String,
    status: BookingStatus,
    created_at: OffsetDateTime,
    rider_first_name: Option<String>,
    rider_last_name: Option<String>,
    rider_phone_number: Option<String>,
    driver_first_name: Option<String>,
    driver_last_name: Option<String>,
    driver_phone_number: Option<String>,
}

fn party(
    id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
) -> Option<Party> {
    Some(Party {
        id: id?,
        first_name: first_name?,
        last_name: last_name?,
        phone_number,
    })
}

impl From<BookingPartiesRow> for BookingWithParties {
    fn from(r: BookingPartiesRow) -> Self {
        let rider = party(
            Some(r.rider_id),
            r.rider_first_name,
            r.rider_last_name,
            r.rider_phone_number,
        );
        let driver = party(
            r.driver_id,
            r.driver_first_name,
            r.driver_last_name,
            r.driver_phone_number,
        );
        Self {
            booking: Booking {
                id: r.id,
                rider_id: r.rider_id,
                driver_id: r.driver_id,
                date: r.date,
                time: r.time,
                pick_from: r.pick_from,
                destination: r.destination,
                passengers: r.passengers,
                vehicle_type: r.vehicle_type,
                status: r.status,
                created_at: r.created_at,
            },
            rider,
            driver,
        }
    }
}

#[async_trait]
impl BookingRepo for PgBookings {
    async fn insert(&self, b: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, rider_id, driver_id, date, time, pick_from, destination,
                                  passengers, vehicle_type, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(b.id)
        .bind(b.rider_id)
        .bind(b.driver_id)
        .bind(b.date)
        .bind(&b.time)
        .bind(&b.pick_from)
        .bind(&b.destination)
        .bind(b.passengers)
        .bind(&b.vehicle_type)
        .bind(b.status)
        .bind(b.created_at)
        .execute(&self.db)
        .await
        .context("insert booking")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find booking by id")
    }

    async fn list_with_parties(&self) -> anyhow::Result<Vec<BookingWithParties>> {
        let rows = sqlx::query_as::<_, BookingPartiesRow>(
            r#"
            SELECT b.id, b.rider_id, b.driver_id, b.date, b.time, b.pick_from, b.destination,
                   b.passengers, b.vehicle_type, b.status, b.created_at,
                   r.first_name AS rider_first_name,
                   r.last_name AS rider_last_name,
                   r.phone_number AS rider_phone_number,
                   d.first_name AS driver_first_name,
                   d.last_name AS driver_last_name,
                   d.phone_number AS driver_phone_number
              FROM bookings b
              LEFT JOIN riders r ON r.id = b.rider_id
              LEFT JOIN drivers d ON d.id = b.driver_id
             ORDER BY b.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list bookings")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn assign_driver(&self, booking_id: Uuid, driver_id: Uuid) -> anyhow::Result<Assignment> {
        let sql = format!(
            r#"
            UPDATE bookings b
               SET driver_id = $2, status = 'Booked'
             WHERE b.id = $1
               AND b.status = 'Pending'
               AND NOT EXISTS (
                   SELECT 1 FROM bookings o
                    WHERE o.driver_id = $2
                      AND o.status = 'Booked'
                      AND o.date = b.date
                      AND o.time = b.time)
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .bind(driver_id)
            .fetch_optional(&self.db)
            .await;

        match updated {
            Ok(Some(b)) => return Ok(Assignment::Assigned(b)),
            Ok(None) => {}
            // A concurrent assignment won the driver slot index.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Ok(Assignment::DriverBusy)
            }
            Err(e) => return Err(e).context("assign driver"),
        }

        Ok(match self.find_by_id(booking_id).await? {
            None => Assignment::BookingMissing,
            Some(b) if b.status == BookingStatus::Booked => Assignment::AlreadyBooked,
            Some(_) => Assignment::DriverBusy,
        })
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete booking")?;
        Ok(res.rows_affected() == 1)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::accounts::{
        repo::memory::MemoryAccounts,
        repo_types::{Driver, Rider},
    };

    /// Bookings kept in insertion order. Joins against the in-memory account
    /// tables it was built with.
    pub struct MemoryBookings {
        rows: Mutex<Vec<Booking>>,
        riders: Arc<MemoryAccounts<Rider>>,
        drivers: Arc<MemoryAccounts<Driver>>,
    }

    impl MemoryBookings {
        pub fn new(riders: Arc<MemoryAccounts<Rider>>, drivers: Arc<MemoryAccounts<Driver>>) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                riders,
                drivers,
            }
        }

        pub fn get(&self, id: Uuid) -> Option<Booking> {
            self.rows.lock().unwrap().iter().find(|b| b.id == id).cloned()
        }
    }

    #[async_trait]
    impl BookingRepo for MemoryBookings {
        async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
            self.rows.lock().unwrap().push(booking.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
            Ok(self.get(id))
        }

        async fn list_with_parties(&self) -> anyhow::Result<Vec<BookingWithParties>> {
            let rows = self.rows.lock().unwrap().clone();
            Ok(rows
                .into_iter()
                .rev()
                .map(|booking| {
                    let rider = self.riders.get(booking.rider_id).map(|r| Party {
                        id: r.state.id,
                        first_name: r.first_name,
                        last_name: r.last_name,
                        phone_number: r.phone_number,
                    });
                    let driver = booking
                        .driver_id
                        .and_then(|id| self.drivers.get(id))
                        .map(|d| Party {
                            id: d.state.id,
                            first_name: d.first_name,
                            last_name: d.last_name,
                            phone_number: Some(d.phone_number),
                        });
                    BookingWithParties {
                        booking,
                        rider,
                        driver,
                    }
                })
                .collect())
        }

        async fn assign_driver(&self, booking_id: Uuid, driver_id: Uuid) -> anyhow::Result<Assignment> {
            let mut rows = self.rows.lock().unwrap();
            let Some(target) = rows.iter().find(|b| b.id == booking_id).cloned() else {
                return Ok(Assignment::BookingMissing);
            };
            if target.status != BookingStatus::Pending {
                return Ok(Assignment::AlreadyBooked);
            }
            let busy = rows.iter().any(|b| {
                b.driver_id == Some(driver_id)
                    && b.status == BookingStatus::Booked
                    && b.same_slot(&target)
            });
            if busy {
                return Ok(Assignment::DriverBusy);
            }
            let Some(b) = rows.iter_mut().find(|b| b.id == booking_id) else {
                return Ok(Assignment::BookingMissing);
            };
            b.driver_id = Some(driver_id);
            b.status = BookingStatus::Booked;
            Ok(Assignment::Assigned(b.clone()))
        }

        async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|b| b.id != id);
            Ok(rows.len() != before)
        }
    }
}
