use serde::{Deserialize, Serialize};

use crate::validation::lenient_string;

/// Request body for rider registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderRegisterRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: String,
}

/// Request body for driver registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRegisterRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub license_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub car_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub car_model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub car_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_made: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendOtpRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
}

/// Login response: the public profile plus a bearer token.
#[derive(Debug, Serialize)]
pub struct LoginData<P> {
    #[serde(flatten)]
    pub profile: P,
    pub token: String,
}
