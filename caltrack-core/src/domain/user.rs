//! User domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::{ActivityLevel, Sex};
use super::result::{Error, Result};

/// Store-assigned identifier of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user
///
/// The password hash never leaves the credential store, so it is not part
/// of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.into(),
            created_at,
        }
    }
}

/// Normalize and validate a username for registration or lookup
pub fn normalize_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("username must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Persisted biometric profile of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
}

impl Profile {
    /// Build a profile, rejecting non-positive age or height
    pub fn new(sex: Sex, age: u32, height_cm: f64, activity_level: ActivityLevel) -> Result<Self> {
        if age == 0 {
            return Err(Error::invalid_input("age must be greater than zero"));
        }
        if !height_cm.is_finite() || height_cm <= 0.0 {
            return Err(Error::invalid_input("height must be greater than zero"));
        }
        Ok(Self {
            sex,
            age,
            height_cm,
            activity_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username_trims() {
        assert_eq!(normalize_username("  alice ").unwrap(), "alice");
    }

    #[test]
    fn test_normalize_username_rejects_blank() {
        assert!(matches!(
            normalize_username("   "),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_profile_validation() {
        assert!(Profile::new(Sex::Female, 0, 165.0, ActivityLevel::Light).is_err());
        assert!(Profile::new(Sex::Female, 30, 0.0, ActivityLevel::Light).is_err());
        assert!(Profile::new(Sex::Female, 30, f64::NAN, ActivityLevel::Light).is_err());
        assert!(Profile::new(Sex::Female, 30, 165.0, ActivityLevel::Light).is_ok());
    }

    #[test]
    fn test_user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
