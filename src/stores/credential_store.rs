use crate::errors::internal::{CredentialError, InternalError};
use crate::types::db::refresh_token::{
    ActiveModel as RefreshTokenActiveModel, Column as RefreshTokenColumn,
    Entity as RefreshToken,
};
use crate::types::db::user::{self, ActiveModel as UserActiveModel, Entity as User};
use crate::types::internal::auth::Role;
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// CredentialStore manages user credentials and refresh tokens in the database
///
/// Passwords are stored only as Argon2id hashes with a server-side pepper;
/// the raw credential never touches a log line or a response body.
pub struct CredentialStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl CredentialStore {
    /// Create a new CredentialStore with the given database connection and password pepper
    ///
    /// # Arguments
    /// * `db` - The database connection
    /// * `password_pepper` - The secret key used for password hashing
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self { db, password_pepper }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a plaintext password with Argon2id and the configured pepper
    ///
    /// # Returns
    /// * `Ok(String)` - PHC-format hash string safe to persist
    /// * `Err(InternalError)` - Hashing failure
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                InternalError::from(CredentialError::PasswordHashingFailed(e.to_string()))
            })?
            .to_string();
        Ok(hash)
    }

    /// Insert a staff account if its id is not already taken
    ///
    /// Used by startup seeding for the admin, doctor, and radiologist
    /// accounts; patient accounts are created through the patient store so
    /// the identity row and the record row share a transaction.
    ///
    /// # Returns
    /// * `Ok(true)` - Account created
    /// * `Ok(false)` - Account already existed, nothing written
    pub async fn ensure_staff_user(
        &self,
        id: &str,
        name: &str,
        role: Role,
        password: &str,
    ) -> Result<bool, InternalError> {
        let existing = User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user", e))?;

        if existing.is_some() {
            return Ok(false);
        }

        let now = Utc::now().timestamp();
        let new_user = UserActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            role: Set(role.as_str().to_string()),
            password_hash: Set(self.hash_password(password)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_user
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert user", e))?;

        Ok(true)
    }

    /// Verify user credentials and return the matching user row on success
    ///
    /// # Arguments
    /// * `username` - The login id to verify
    /// * `password` - The plaintext password to verify
    ///
    /// # Returns
    /// * `Ok(user::Model)` - The user row if credentials are valid
    /// * `Err(InternalError::Credential(InvalidCredentials))` - Unknown id or
    ///   wrong password, indistinguishable from each other
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, InternalError> {
        let user = User::find_by_id(username)
            .one(&self.db)
            .await
            .map_err(|_| InternalError::from(CredentialError::InvalidCredentials))?
            .ok_or_else(|| InternalError::from(CredentialError::InvalidCredentials))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| InternalError::from(CredentialError::InvalidCredentials))?;

        self.argon2()
            .map_err(|_| InternalError::from(CredentialError::InvalidCredentials))?
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| InternalError::from(CredentialError::InvalidCredentials))?;

        Ok(user)
    }

    /// Look up a user row by id
    pub async fn get_user(&self, id: &str) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user", e))
    }

    /// Store a refresh token hash in the database
    ///
    /// # Arguments
    /// * `token_hash` - The HMAC-SHA256 hash of the refresh token
    /// * `user_id` - The user id this token belongs to
    /// * `expires_at` - Unix timestamp when the token expires
    pub async fn store_refresh_token(
        &self,
        token_hash: String,
        user_id: String,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        let new_token = RefreshTokenActiveModel {
            token_hash: Set(token_hash),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().timestamp()),
        };

        new_token
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert refresh token", e))?;

        Ok(())
    }

    /// Validate a refresh token hash and return the associated user id
    ///
    /// # Returns
    /// * `Ok(String)` - The user id if the token is known and unexpired
    /// * `Err(InternalError)` - InvalidToken if unknown, ExpiredToken if expired
    pub async fn validate_refresh_token(&self, token_hash: &str) -> Result<String, InternalError> {
        let token = RefreshToken::find()
            .filter(RefreshTokenColumn::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find refresh token", e))?
            .ok_or_else(|| {
                InternalError::from(CredentialError::invalid_token("refresh", "unknown token"))
            })?;

        if token.expires_at < Utc::now().timestamp() {
            return Err(InternalError::from(CredentialError::ExpiredToken(
                "refresh".to_string(),
            )));
        }

        Ok(token.user_id)
    }

    /// Revoke a refresh token by deleting it from the database
    ///
    /// The refresh token itself is the authority; no user check is made.
    ///
    /// # Returns
    /// * `Ok(user_id)` - Token revoked, returns the owner id for logging
    /// * `Err(InternalError)` - InvalidToken if the hash is unknown
    pub async fn revoke_refresh_token(&self, token_hash: &str) -> Result<String, InternalError> {
        let token = RefreshToken::find()
            .filter(RefreshTokenColumn::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find refresh token", e))?
            .ok_or_else(|| {
                InternalError::from(CredentialError::invalid_token("refresh", "unknown token"))
            })?;

        let user_id = token.user_id.clone();

        RefreshToken::delete_many()
            .filter(RefreshTokenColumn::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete refresh token", e))?;

        Ok(user_id)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("db", &"<connection>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
