pub mod jwt;
pub mod otp;
pub mod password;

pub use jwt::{AuthUser, JwtKeys};
