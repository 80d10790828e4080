/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication for the pricing API. Tokens are issued on
 * login against the users table and validated by middleware on every
 * protected route. Authorization is role-based: `admin` accounts may
 * mutate prices and review change requests, `standard` accounts may read
 * and submit requests.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub mod user;

pub use user::UserRole;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub name: String,  // User's name
    pub email: String, // User's email
    pub role: String,  // User's role
    pub jti: String,   // JWT ID (unique identifier for this token)
    pub iat: i64,      // Issued at time
    pub exp: i64,      // Expiration time
    pub nbf: i64,      // Not valid before time
    pub iss: String,   // Issuer
    pub aud: String,   // Audience
}

/// Authenticated principal extracted from a validated token and threaded
/// explicitly into every mutating service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Check if the user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                self.to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                self.to_string(),
            ),
            Self::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                self.to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_FORBIDDEN",
                self.to_string(),
            ),
            Self::ValidationError(_) => (
                StatusCode::BAD_REQUEST,
                "AUTH_VALIDATION_ERROR",
                self.to_string(),
            ),
            Self::AccountExists(_) => (
                StatusCode::CONFLICT,
                "AUTH_ACCOUNT_EXISTS",
                self.to_string(),
            ),
            Self::TokenCreation(_) | Self::HashError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal authentication error".to_string(),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_DATABASE_ERROR",
                "Internal authentication error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub name: String,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            name: model.name,
        }
    }
}

/// Payload for creating a user account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: String,
    pub role: UserRole,
}

/// Login credentials
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginCredentials {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Authentication service that handles account lookup and token issuance
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Create a user account with an argon2-hashed password
    #[instrument(skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model, AuthError> {
        new_user
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(new_user.email.clone()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::AccountExists(new_user.email));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let account = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            role: Set(new_user.role),
            name: Set(new_user.name),
            created_at: Set(Utc::now()),
        };

        account
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    /// Validate login credentials, returning the account on success
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(account)
    }

    /// Generate a signed access token for a user
    pub fn generate_token(&self, account: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate an access token and produce the authenticated principal
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.clone()]);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Malformed subject claim".to_string()))?;

        Ok(AuthUser {
            user_id,
            name: claims.name,
            email: claims.email,
            role: UserRole::parse(&claims.role),
        })
    }

    /// Number of seconds issued tokens stay valid
    pub fn token_ttl_secs(&self) -> i64 {
        self.config.access_token_expiration.as_secs() as i64
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = match request.extensions().get::<AuthUser>() {
        Some(principal) => principal.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if principal.role.as_str() != required_role {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service) {
        Ok(principal) => {
            debug!(user_id = %principal.user_id, "Authenticated request");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                return auth_service.validate_token(token);
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Authentication routes: public login plus the authenticated identity
/// endpoint
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    let public = axum::Router::new().route("/login", axum::routing::post(login_handler));
    let protected = axum::Router::new()
        .route("/me", axum::routing::get(me_handler))
        .with_auth();
    public.merge(protected)
}

/// Returns the authenticated principal
pub async fn me_handler(
    axum::Extension(principal): axum::Extension<AuthUser>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": principal }))
}

/// Login handler
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    credentials
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let account = auth_service
        .verify_credentials(&credentials.email, &credentials.password)
        .await?;
    let access_token = auth_service.generate_token(&account)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_service.token_ttl_secs(),
        user: UserProfile::from(account),
    }))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        let config = AuthConfig::new(
            "unit_test_secret_that_is_long_enough_for_hs256_token_signing_0123456789".into(),
            "pricedesk-api".into(),
            "pricedesk-auth".into(),
            Duration::from_secs(3600),
        );
        // Token generation/validation never touches the connection.
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(config, db)
    }

    fn test_account(role: UserRole) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "ops@example.com".into(),
            password_hash: String::new(),
            role,
            name: "Ops".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_principal() {
        let service = test_service();
        let account = test_account(UserRole::Admin);

        let token = service.generate_token(&account).unwrap();
        let principal = service.validate_token(&token).unwrap();

        assert_eq!(principal.user_id, account.id);
        assert_eq!(principal.email, account.email);
        assert!(principal.is_admin());
    }

    #[test]
    fn standard_role_is_not_admin() {
        let service = test_service();
        let account = test_account(UserRole::Standard);

        let token = service.generate_token(&account).unwrap();
        let principal = service.validate_token(&token).unwrap();

        assert!(!principal.is_admin());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let account = test_account(UserRole::Admin);

        let mut token = service.generate_token(&account).unwrap();
        token.push('x');

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
