use serde::Deserialize;

use crate::validation::lenient_string;

/// Request body for booking creation. The rider comes from the token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pick_from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub destination: String,
    #[serde(default, alias = "noOfPessengers", deserialize_with = "lenient_string")]
    pub no_of_passengers: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vehicle_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    #[serde(default, rename = "bookingID", deserialize_with = "lenient_string")]
    pub booking_id: String,
    #[serde(default, rename = "driverID", deserialize_with = "lenient_string")]
    pub driver_id: String,
}
