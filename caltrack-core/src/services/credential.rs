//! Credential service - registration, login and profile management
//!
//! Passwords are stored as Argon2id PHC strings with a random 16-byte salt,
//! so the algorithm parameters travel with each hash.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::Rng;

use crate::domain::{normalize_username, Error, Profile, Result, User, UserId};
use crate::ports::UserRepository;

/// Credential store operations
pub struct CredentialService {
    repository: Arc<dyn UserRepository>,
}

impl CredentialService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new user and return their id
    pub fn register(&self, username: &str, password: &str) -> Result<UserId> {
        let (username, hash) = prepare_credentials(username, password)?;
        self.repository.insert_user(&username, &hash, Utc::now())
    }

    /// Register a user and save their profile atomically
    pub fn register_with_profile(
        &self,
        username: &str,
        password: &str,
        profile: &Profile,
    ) -> Result<UserId> {
        let profile = checked(profile)?;
        let (username, hash) = prepare_credentials(username, password)?;
        self.repository.insert_user_with_profile(&username, &hash, Utc::now(), &profile)
    }

    /// Verify a username/password pair
    ///
    /// An unknown username and a wrong password fail the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserId> {
        let username = username.trim();
        let stored = self
            .repository
            .find_credentials(username)?
            .ok_or(Error::InvalidCredentials)?;

        if verify_password(password, &stored.password_hash)? {
            Ok(stored.user_id)
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    /// Get a user by id
    pub fn user(&self, id: UserId) -> Result<User> {
        self.repository
            .get_user(id)?
            .ok_or_else(|| Error::not_found(format!("user {}", id)))
    }

    /// Replace the user's biometric profile
    pub fn update_profile(&self, id: UserId, profile: &Profile) -> Result<()> {
        let profile = checked(profile)?;
        self.user(id)?;
        self.repository.upsert_profile(id, &profile)
    }

    /// Get the user's profile, `None` if it was never set
    pub fn profile(&self, id: UserId) -> Result<Option<Profile>> {
        self.repository.get_profile(id)
    }

    /// Delete the account and every entry it owns
    pub fn delete_account(&self, id: UserId) -> Result<()> {
        if self.repository.delete_user(id)? {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {}", id)))
        }
    }
}

/// Re-run the constructor checks; profile fields are public
fn checked(profile: &Profile) -> Result<Profile> {
    Profile::new(
        profile.sex,
        profile.age,
        profile.height_cm,
        profile.activity_level,
    )
}

fn prepare_credentials(username: &str, password: &str) -> Result<(String, String)> {
    let username = normalize_username(username)?;
    if password.is_empty() {
        return Err(Error::invalid_input("password must not be empty"));
    }
    Ok((username, hash_password(password)?))
}

/// Hash a password with Argon2id and a fresh random salt
fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::database(format!("Failed to encode salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::database(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::database(format!("Stored password hash is invalid: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::database(format!("Failed to verify password: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::{ActivityLevel, Sex};

    fn service() -> CredentialService {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();
        CredentialService::new(Arc::new(repo))
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &a).unwrap());
        assert!(!verify_password("hunter3", &a).unwrap());
    }

    #[test]
    fn test_register_then_authenticate() {
        let service = service();
        let id = service.register("alice", "s3cret").unwrap();
        assert_eq!(service.authenticate("alice", "s3cret").unwrap(), id);
    }

    #[test]
    fn test_wrong_password() {
        let service = service();
        service.register("alice", "s3cret").unwrap();
        assert!(matches!(
            service.authenticate("alice", "nope"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_user() {
        let service = service();
        assert!(matches!(
            service.authenticate("ghost", "whatever"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_user() {
        let service = service();
        service.register("alice", "one").unwrap();
        assert!(matches!(
            service.register(" alice ", "two"),
            Err(Error::DuplicateUser(_))
        ));
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let service = service();
        assert!(matches!(service.register("", "pw"), Err(Error::InvalidInput(_))));
        assert!(matches!(service.register("bob", ""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_update_profile_requires_user() {
        let service = service();
        let profile = Profile::new(Sex::Male, 30, 180.0, ActivityLevel::Moderate).unwrap();
        assert!(matches!(
            service.update_profile(UserId(42), &profile),
            Err(Error::NotFound(_))
        ));

        let id = service.register_with_profile("carol", "pw", &profile).unwrap();
        assert_eq!(service.profile(id).unwrap(), Some(profile));
    }

    #[test]
    fn test_update_profile_validates() {
        let service = service();
        let id = service.register("dave", "pw").unwrap();
        let bad = Profile {
            sex: Sex::Male,
            age: 0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Sedentary,
        };
        assert!(matches!(
            service.update_profile(id, &bad),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_register_with_invalid_profile_creates_no_user() {
        let service = service();
        let bad = Profile {
            sex: Sex::Female,
            age: 0,
            height_cm: -5.0,
            activity_level: ActivityLevel::Light,
        };
        assert!(matches!(
            service.register_with_profile("zed", "pw", &bad),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            service.authenticate("zed", "pw"),
            Err(Error::InvalidCredentials)
        ));

        // The name is still free once a valid profile is supplied
        let good = Profile::new(Sex::Female, 41, 165.0, ActivityLevel::Light).unwrap();
        let id = service.register_with_profile("zed", "pw", &good).unwrap();
        assert_eq!(service.profile(id).unwrap(), Some(good));
    }

    #[test]
    fn test_register_with_profile_duplicate_keeps_original_profile() {
        let service = service();
        let first = Profile::new(Sex::Male, 30, 180.0, ActivityLevel::Active).unwrap();
        let id = service.register_with_profile("yan", "pw", &first).unwrap();

        let second = Profile::new(Sex::Male, 50, 170.0, ActivityLevel::Sedentary).unwrap();
        assert!(matches!(
            service.register_with_profile("yan", "other", &second),
            Err(Error::DuplicateUser(_))
        ));
        assert_eq!(service.profile(id).unwrap(), Some(first));
    }

    #[test]
    fn test_delete_account() {
        let service = service();
        let id = service.register("erin", "pw").unwrap();
        service.delete_account(id).unwrap();
        assert!(matches!(
            service.authenticate("erin", "pw"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(service.delete_account(id), Err(Error::NotFound(_))));
    }
}
