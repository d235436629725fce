//! # Auth Module
//!
//! Bearer-token verification and the explicit [`Principal`] passed into
//! every promotion operation. Account registration and password handling
//! belong to the account service and are not part of this crate.

pub mod errors;
pub mod jwt;
pub mod principal;

pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use principal::{Principal, UserType};
