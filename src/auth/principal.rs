//! # Principal
//!
//! The authenticated identity threaded explicitly into every promotion
//! operation. Token handling lives in [`super::jwt`]; nothing here reads
//! request-scoped or global state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Foodie,
    Restaurant,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Foodie => "Foodie",
            UserType::Restaurant => "Restaurant",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Foodie" | "foodie" => Ok(UserType::Foodie),
            "Restaurant" | "restaurant" => Ok(UserType::Restaurant),
            other => Err(AuthError::UnknownUserType(other.to_string())),
        }
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub user_type: UserType,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, user_type: UserType) -> Self {
        Self {
            user_id: user_id.into(),
            user_type,
        }
    }

    pub fn foodie(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserType::Foodie)
    }

    pub fn restaurant(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserType::Restaurant)
    }

    /// True when this principal is the given user
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// True when this principal is the given restaurant account
    pub fn is_restaurant(&self, restaurant_id: &str) -> bool {
        self.user_type == UserType::Restaurant && self.is(restaurant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parsing() {
        assert_eq!("Foodie".parse::<UserType>().unwrap(), UserType::Foodie);
        assert_eq!("restaurant".parse::<UserType>().unwrap(), UserType::Restaurant);
        assert!(matches!(
            "Admin".parse::<UserType>(),
            Err(AuthError::UnknownUserType(_))
        ));
    }

    #[test]
    fn test_restaurant_ownership() {
        let r1 = Principal::restaurant("r1");
        assert!(r1.is_restaurant("r1"));
        assert!(!r1.is_restaurant("r2"));

        // A foodie sharing an id with a restaurant is still not that restaurant
        assert!(!Principal::foodie("r1").is_restaurant("r1"));
    }

    #[test]
    fn test_user_type_serializes_as_name() {
        let json = serde_json::to_string(&Principal::foodie("f1")).unwrap();
        assert!(json.contains("\"Foodie\""));
    }
}
