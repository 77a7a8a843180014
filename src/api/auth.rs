use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::auth::AuthError;
use crate::types::dto::auth::{
    LoginRequest, LogoutRequest, LogoutResponse, RefreshRequest, RefreshResponse, TokenResponse,
    WhoAmIResponse,
};
use crate::types::internal::auth::Role;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Authentication API endpoints
pub struct AuthApi {
    app_data: Arc<AppData>,
}

impl AuthApi {
    /// Create a new AuthApi backed by the shared application data
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password to receive authentication tokens
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    pub async fn login(&self, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        // Verify credentials using database
        let user = self
            .app_data
            .credential_store
            .verify_credentials(&body.username, &body.password)
            .await?;

        let role = user
            .role
            .parse::<Role>()
            .map_err(AuthError::internal_error)?;

        // Generate JWT carrying the full identity for the permission table
        let access_token = self
            .app_data
            .token_service
            .generate_jwt(&user.id, &user.name, role)?;

        // Generate refresh token, store only its hash
        let refresh_token = self.app_data.token_service.generate_refresh_token();
        let token_hash = self.app_data.token_service.hash_refresh_token(&refresh_token);
        let expires_at = self.app_data.token_service.get_refresh_expiration();
        self.app_data
            .credential_store
            .store_refresh_token(token_hash, user.id.clone(), expires_at)
            .await?;

        tracing::info!(user = %user.id, role = %user.role, "login succeeded");

        Ok(Json(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.app_data.token_service.access_token_lifetime_secs(),
            role: user.role,
            name: user.name,
        }))
    }

    /// Verify JWT and return user information
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(&self, auth: BearerAuth) -> Result<Json<WhoAmIResponse>, AuthError> {
        let claims = self.app_data.token_service.validate_jwt(&auth.0.token)?;

        Ok(Json(WhoAmIResponse {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
            expires_at: claims.exp,
        }))
    }

    /// Refresh access token using a refresh token
    #[oai(path = "/refresh", method = "post", tag = "AuthTags::Authentication")]
    async fn refresh(&self, body: Json<RefreshRequest>) -> Result<Json<RefreshResponse>, AuthError> {
        // Hash the refresh token and look it up
        let token_hash = self.app_data.token_service.hash_refresh_token(&body.refresh_token);
        let user_id = self
            .app_data
            .credential_store
            .validate_refresh_token(&token_hash)
            .await?;

        // Rebuild the identity from the database so role changes take effect
        let user = self
            .app_data
            .credential_store
            .get_user(&user_id)
            .await?
            .ok_or_else(AuthError::invalid_refresh_token)?;

        let role = user
            .role
            .parse::<Role>()
            .map_err(AuthError::internal_error)?;

        let access_token = self
            .app_data
            .token_service
            .generate_jwt(&user.id, &user.name, role)?;

        Ok(Json(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.app_data.token_service.access_token_lifetime_secs(),
        }))
    }

    /// Logout and revoke refresh token
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        auth: BearerAuth,
        body: Json<LogoutRequest>,
    ) -> Result<Json<LogoutResponse>, AuthError> {
        // Only an authenticated caller may revoke
        let user = authenticate(&self.app_data.token_service, &auth)?;

        let token_hash = self.app_data.token_service.hash_refresh_token(&body.refresh_token);
        let owner = self
            .app_data
            .credential_store
            .revoke_refresh_token(&token_hash)
            .await?;

        tracing::info!(user = %user.id, owner = %owner, "refresh token revoked");

        Ok(Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ApplicationSettings, SeedAccounts};
    use crate::types::internal::auth::Claims;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_app_data() -> Arc<AppData> {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = ApplicationSettings {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret-key-minimum-32-characters-long".to_string(),
            refresh_token_secret: "test-refresh-secret-minimum-32-chars".to_string(),
            password_pepper: "test-pepper-for-api-tests-0123456789".to_string(),
            upload_dir: upload_dir.into_path(),
            model_assets_dir: "model_assets_missing".into(),
            seed_accounts: SeedAccounts::default(),
        };

        let app_data = Arc::new(AppData::init(settings, db).expect("Failed to init app data"));

        app_data
            .credential_store
            .ensure_staff_user("doctor1", "Dr. Saravana Kumar", Role::Doctor, "Consult4@you")
            .await
            .expect("Failed to seed test user");

        app_data
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let request = Json(LoginRequest {
            username: "doctor1".to_string(),
            password: "Consult4@you".to_string(),
        });

        let result = api.login(request).await;

        assert!(result.is_ok());
        let response = result.unwrap();
        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 900);
        assert_eq!(response.role, "doctor");
        assert_eq!(response.name, "Dr. Saravana Kumar");
    }

    #[tokio::test]
    async fn test_login_with_invalid_credentials() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let request = Json(LoginRequest {
            username: "doctor1".to_string(),
            password: "wrongpass".to_string(),
        });

        let result = api.login(request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_login_with_nonexistent_user() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let request = Json(LoginRequest {
            username: "nonexistent".to_string(),
            password: "somepass".to_string(),
        });

        let result = api.login(request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_login_returns_decodable_jwt_with_identity() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let request = Json(LoginRequest {
            username: "doctor1".to_string(),
            password: "Consult4@you".to_string(),
        });

        let response = api.login(request).await.unwrap();

        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let decoded = decode::<Claims>(
            &response.access_token,
            &DecodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, "doctor1");
        assert_eq!(decoded.claims.role, "doctor");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 900);
    }

    #[tokio::test]
    async fn test_refresh_returns_new_access_token() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let login = api
            .login(Json(LoginRequest {
                username: "doctor1".to_string(),
                password: "Consult4@you".to_string(),
            }))
            .await
            .unwrap();

        let refreshed = api
            .refresh(Json(RefreshRequest {
                refresh_token: login.refresh_token.clone(),
            }))
            .await
            .unwrap();

        assert!(!refreshed.access_token.is_empty());
        assert_eq!(refreshed.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_token() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let result = api
            .refresh(Json(RefreshRequest {
                refresh_token: "made-up-token".to_string(),
            }))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidRefreshToken(_))));
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh_token() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let login = api
            .login(Json(LoginRequest {
                username: "doctor1".to_string(),
                password: "Consult4@you".to_string(),
            }))
            .await
            .unwrap();

        let auth = BearerAuth(poem_openapi::auth::Bearer {
            token: login.access_token.clone(),
        });

        let logout = api
            .logout(
                auth,
                Json(LogoutRequest {
                    refresh_token: login.refresh_token.clone(),
                }),
            )
            .await;
        assert!(logout.is_ok());

        // The revoked token no longer refreshes
        let result = api
            .refresh(Json(RefreshRequest {
                refresh_token: login.refresh_token.clone(),
            }))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRefreshToken(_))));
    }

    #[tokio::test]
    async fn test_whoami_reports_claims() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let login = api
            .login(Json(LoginRequest {
                username: "doctor1".to_string(),
                password: "Consult4@you".to_string(),
            }))
            .await
            .unwrap();

        let auth = BearerAuth(poem_openapi::auth::Bearer {
            token: login.access_token.clone(),
        });

        let whoami = api.whoami(auth).await.unwrap();
        assert_eq!(whoami.user_id, "doctor1");
        assert_eq!(whoami.role, "doctor");
        assert_eq!(whoami.name, "Dr. Saravana Kumar");
    }

    #[tokio::test]
    async fn test_whoami_rejects_garbage_token() {
        let app_data = setup_app_data().await;
        let api = AuthApi::new(app_data);

        let auth = BearerAuth(poem_openapi::auth::Bearer {
            token: "garbage".to_string(),
        });

        let result = api.whoami(auth).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
