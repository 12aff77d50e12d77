//! Account registration, authentication and profile service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult, FieldErrors},
    models::{
        favorite::Favorite,
        search_log::SearchLog,
        user::{LoginRequest, LoginType, RegisterUser, User, UserClaims},
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";
const RECENT_OWN_SEARCHES: i64 = 10;

/// Signed-in user's profile page data
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub favorites: Vec<Favorite>,
    pub recent_searches: Vec<SearchLog>,
    pub favorites_count: i64,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create an account from the registration form
    pub async fn register(&self, form: RegisterUser) -> AppResult<User> {
        form.check()?;

        if self.repository.users.username_exists(&form.username).await? {
            let mut errors = FieldErrors::new();
            errors.add("username", "A user with that username already exists.");
            errors.into_result()?;
        }

        let hash = hash_password(&form.password1)?;
        let user = self.repository.users.create(&form, &hash).await?;
        tracing::info!("Registered user id={} username={}", user.id, user.username);
        Ok(user)
    }

    /// Authenticate by username and password and return a JWT token
    pub async fn authenticate(&self, login: &LoginRequest) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(&login.username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !user.is_active || !verify_password(&user, &login.password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if login.login_type == LoginType::Admin && !user.is_staff {
            return Err(AppError::Authorization(
                "You do not have admin privileges.".to_string(),
            ));
        }

        let token = UserClaims::for_user(&user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        self.repository.users.touch_last_login(user.id).await?;
        tracing::info!("User {} signed in", user.username);

        Ok((token, user))
    }

    /// Decode a bearer token and reject it once revoked or when its
    /// account is gone
    pub async fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

        let revoked = self.repository.users.is_token_revoked(claims.jti).await?;
        let active = self.repository.users.is_active(claims.user_id).await?;
        session_check(revoked, active)?;
        Ok(claims)
    }

    /// Revoke the token the claims were read from
    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        self.repository
            .users
            .revoke_token(claims.jti, claims.expires_at())
            .await?;
        tracing::info!("User {} signed out", claims.sub);
        Ok(())
    }

    pub async fn profile(&self, user_id: i32, favorites: Vec<Favorite>) -> AppResult<Profile> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let recent_searches = self
            .repository
            .search_logs
            .recent_for_user(user_id, RECENT_OWN_SEARCHES)
            .await?;
        let favorites_count = self.repository.favorites.count_for_user(user_id).await?;

        Ok(Profile {
            user,
            favorites,
            recent_searches,
            favorites_count,
        })
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn session_check(revoked: bool, account_active: bool) -> AppResult<()> {
    if revoked {
        return Err(AppError::Authentication("Token has been revoked".to_string()));
    }
    if !account_active {
        return Err(AppError::Authentication("User account no longer exists or is disabled".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_password(password: &str) -> User {
        User {
            id: 1,
            username: "reader".into(),
            email: "reader@example.org".into(),
            first_name: "Rea".into(),
            last_name: "Der".into(),
            password: hash_password(password).unwrap(),
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let user = user_with_password("long enough secret");
        assert!(user.password.starts_with("$argon2"));
        assert!(verify_password(&user, "long enough secret").unwrap());
        assert!(!verify_password(&user, "wrong secret").unwrap());
    }

    #[test]
    fn test_broken_hash_is_internal_error() {
        let mut user = user_with_password("whatever");
        user.password = "not-a-hash".into();
        assert!(matches!(
            verify_password(&user, "whatever"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_session_check() {
        assert!(session_check(false, true).is_ok());
        assert!(matches!(session_check(true, true), Err(AppError::Authentication(_))));

        match session_check(false, false) {
            Err(AppError::Authentication(msg)) => assert!(msg.contains("no longer exists")),
            other => panic!("expected authentication error, got {:?}", other),
        }
    }
}
