use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Rider,
    Driver,
    #[serde(rename = "admin")]
    Admin,
}

/// Credentials and lifecycle flags shared by every account table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountState {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_confirmed: bool,
    pub confirm_otp: Option<String>,
    /// Active flag. Only changed out-of-band.
    pub status: bool,
    pub created_at: OffsetDateTime,
}

impl AccountState {
    /// A freshly registered, unconfirmed and active account.
    pub fn unconfirmed(email: String, password_hash: String, otp: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            is_confirmed: false,
            confirm_otp: Some(otp),
            status: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Rider {
    #[sqlx(flatten)]
    pub state: AccountState,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Driver {
    #[sqlx(flatten)]
    pub state: AccountState,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub phone_number: String,
    pub license_number: String,
    pub car_number: String,
    pub car_model: String,
    pub car_type: String,
    pub company_made: String,
}

/// Back-office account. Provisioned directly in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    #[sqlx(flatten)]
    pub state: AccountState,
    pub first_name: String,
    pub last_name: String,
}

/// Lookup criteria understood by every account repository.
#[derive(Debug, Clone, Copy)]
pub enum Filter<'a> {
    Id(Uuid),
    Email(&'a str),
    LicenseNumber(&'a str),
}

/// Outcome of an insert against the unique indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    Ok,
    /// Another account already holds this unique field (request field name).
    Duplicate(&'static str),
}

pub trait Account: Clone + Send + Sync + Unpin + 'static {
    const ROLE: Role;

    type Profile: Serialize + Send + 'static;

    fn state(&self) -> &AccountState;

    /// Lets the in-memory repositories update lifecycle flags in place.
    #[cfg(test)]
    fn state_mut(&mut self) -> &mut AccountState;

    /// Public view: never carries the password hash or the pending code.
    fn profile(&self) -> Self::Profile;

    #[cfg(test)]
    fn license_number(&self) -> Option<&str> {
        None
    }

    #[cfg(test)]
    fn matches(&self, filter: Filter<'_>) -> bool {
        match filter {
            Filter::Id(id) => self.state().id == id,
            Filter::Email(email) => self.state().email == email,
            Filter::LicenseNumber(n) => self.license_number() == Some(n),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_confirmed: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,
    pub phone_number: String,
    pub license_number: String,
    pub car_number: String,
    pub car_model: String,
    pub car_type: String,
    pub company_made: String,
    pub is_confirmed: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl Account for Rider {
    const ROLE: Role = Role::Rider;
    type Profile = RiderProfile;

    fn state(&self) -> &AccountState {
        &self.state
    }
    #[cfg(test)]
    fn state_mut(&mut self) -> &mut AccountState {
        &mut self.state
    }

    fn profile(&self) -> RiderProfile {
        RiderProfile {
            id: self.state.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.state.email.clone(),
            phone_number: self.phone_number.clone(),
            is_confirmed: self.state.is_confirmed,
            role: Self::ROLE,
        }
    }
}

impl Account for Driver {
    const ROLE: Role = Role::Driver;
    type Profile = DriverProfile;

    fn state(&self) -> &AccountState {
        &self.state
    }
    #[cfg(test)]
    fn state_mut(&mut self) -> &mut AccountState {
        &mut self.state
    }

    fn profile(&self) -> DriverProfile {
        DriverProfile {
            id: self.state.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.state.email.clone(),
            age: self.age,
            phone_number: self.phone_number.clone(),
            license_number: self.license_number.clone(),
            car_number: self.car_number.clone(),
            car_model: self.car_model.clone(),
            car_type: self.car_type.clone(),
            company_made: self.company_made.clone(),
            is_confirmed: self.state.is_confirmed,
            role: Self::ROLE,
        }
    }

    #[cfg(test)]
    fn license_number(&self) -> Option<&str> {
        Some(&self.license_number)
    }
}

impl Account for Admin {
    const ROLE: Role = Role::Admin;
    type Profile = AdminProfile;

    fn state(&self) -> &AccountState {
        &self.state
    }
    #[cfg(test)]
    fn state_mut(&mut self) -> &mut AccountState {
        &mut self.state
    }

    fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.state.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.state.email.clone(),
            role: Self::ROLE,
        }
    }
}
