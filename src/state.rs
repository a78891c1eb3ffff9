use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    accounts::{
        repo::{AccountRepo, PgAccounts},
        repo_types::{Admin, Driver, Rider},
    },
    bookings::repo::{BookingRepo, PgBookings},
    config::AppConfig,
    mail::Mailer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub riders: Arc<dyn AccountRepo<Rider>>,
    pub drivers: Arc<dyn AccountRepo<Driver>>,
    pub admins: Arc<dyn AccountRepo<Admin>>,
    pub bookings: Arc<dyn BookingRepo>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn from_pool(config: Arc<AppConfig>, db: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            riders: Arc::new(PgAccounts::<Rider>::new(db.clone())),
            drivers: Arc::new(PgAccounts::<Driver>::new(db.clone())),
            admins: Arc::new(PgAccounts::<Admin>::new(db.clone())),
            bookings: Arc::new(PgBookings::new(db)),
            mailer,
        }
    }
}
