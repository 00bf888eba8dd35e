use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user::{self, Profile};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::{NewUserRecord, UserRepository};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
}

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new donor account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockUserRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: None });
    /// let input = RegisterInput {
    ///     email: "donor@example.com".into(),
    ///     name: "Donor".into(),
    ///     password: "Secret123".into(),
    ///     postal_code: "01310-100".into(),
    ///     linkedin: None,
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "donor@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        user::validate_email(&input.email)?;
        user::validate_name(&input.name)?;
        user::validate_password(&input.password)?;
        user::validate_postal_code(&input.postal_code)?;
        user::validate_linkedin(input.linkedin.as_deref())?;

        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(NewUserRecord {
                email: input.email,
                name: input.name,
                password_hash: hash,
                postal_code: input.postal_code,
                linkedin: input.linkedin,
                profile: Profile::User,
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockUserRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()) });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput {
    ///     email: "u@example.com".into(),
    ///     name: "N".into(),
    ///     password: "Passw0rd".into(),
    ///     postal_code: "20000-000".into(),
    ///     linkedin: None,
    /// }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@example.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@example.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let stored = self
            .repo
            .password_hash(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            token = Some(issue_token(secret, &user)?);
        }

        Ok(AuthSession { user, token })
    }
}

/// Issue an HS256 JWT for the given user, valid for 12 hours.
pub fn issue_token(secret: &str, user: &AuthUser) -> Result<String, AuthError> {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
    let claims = Claims {
        sub: user.email.clone(),
        uid: user.id,
        name: user.name.clone(),
        profile: user.profile,
        exp,
    };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Verify a bearer token and return its claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockUserRepository;

    fn svc(secret: Option<&str>) -> AuthService<MockUserRepository> {
        AuthService::new(
            Arc::new(MockUserRepository::default()),
            AuthConfig { jwt_secret: secret.map(str::to_string) },
        )
    }

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            name: "Donor".into(),
            password: "Sup3rSecret".into(),
            postal_code: "01310-100".into(),
            linkedin: None,
        }
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let svc = svc(None);
        let mut bad = input("donor@example.com");
        bad.postal_code = "".into();
        assert!(matches!(svc.register(bad).await, Err(AuthError::Validation(_))));

        let mut bad = input("donor@example.com");
        bad.password = "short".into();
        assert!(matches!(svc.register(bad).await, Err(AuthError::Validation(_))));

        let bad = input("not-an-email");
        assert!(matches!(svc.register(bad).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let svc = svc(None);
        svc.register(input("dup@example.com")).await.unwrap();
        assert!(matches!(svc.register(input("dup@example.com")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_round_trip_issues_verifiable_token() {
        let svc = svc(Some("secret"));
        let user = svc.register(input("donor@example.com")).await.unwrap();

        let session = svc
            .login(LoginInput { email: "donor@example.com".into(), password: "Sup3rSecret".into() })
            .await
            .unwrap();
        let token = session.token.expect("token issued");
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.sub, "donor@example.com");
        assert_eq!(claims.profile, Profile::User);
    }

    #[tokio::test]
    async fn login_wrong_password_unauthorized() {
        let svc = svc(None);
        svc.register(input("donor@example.com")).await.unwrap();
        let res = svc
            .login(LoginInput { email: "donor@example.com".into(), password: "wrong-pass".into() })
            .await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[test]
    fn verify_rejects_foreign_secret() {
        let user = AuthUser {
            id: uuid::Uuid::new_v4(),
            email: "a@b.co".into(),
            name: "A".into(),
            profile: Profile::Admin,
        };
        let token = issue_token("secret-one", &user).unwrap();
        assert!(verify_token("secret-two", &token).is_err());
        assert_eq!(verify_token("secret-one", &token).unwrap().profile, Profile::Admin);
    }
}
