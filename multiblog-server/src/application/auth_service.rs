use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::info;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, User, normalize_email,
    normalize_username, validate_password,
};
use crate::infrastructure::jwt::{IssuedToken, JwtService};

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) token: IssuedToken,
}

pub(crate) struct AuthService<U: UserRepository> {
    repo: U,
    jwt: JwtService,
}

impl<U: UserRepository> AuthService<U> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: U, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        if self.repo.email_taken(&req.email, None).await? {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }
        if self.repo.username_taken(&req.username, None).await? {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                username: req.username,
                password_hash,
                is_admin: false,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_credentials(&req.login).await? {
            Some(user_creds) => user_creds,
            None => {
                // same verify cost whether or not the user exists
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;
        if !user_creds.user.is_active {
            return Err(DomainError::AccountDisabled);
        }

        let token = self.issue(&user_creds.user)?;
        info!(user_id = user_creds.user.id, "user logged in");
        Ok(AuthResult {
            user: user_creds.user,
            token,
        })
    }

    /// Exchanges the identity of a still-valid token for a fresh token.
    pub(crate) async fn refresh(&self, user_id: i64) -> Result<AuthResult, DomainError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)?;
        if !user.is_active {
            return Err(DomainError::AccountDisabled);
        }

        let token = self.issue(&user)?;
        Ok(AuthResult { user, token })
    }

    pub(crate) async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), DomainError> {
        let req = req.validate()?;

        let user_creds = self
            .repo
            .find_credentials_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        self.verify_password(&req.current_password, &user_creds.password_hash)?;

        let password_hash = self.hash_password(&req.new_password)?;
        if !self.repo.update_password(user_id, &password_hash).await? {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }

        info!(user_id, "password changed");
        Ok(())
    }

    /// Creates the configured admin account unless its email or username is
    /// already registered. Returns the created user.
    pub(crate) async fn bootstrap_admin(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let email = normalize_email(email)?;
        let username = normalize_username(username)?;
        validate_password("password", password)?;

        if self.repo.email_taken(&email, None).await?
            || self.repo.username_taken(&username, None).await?
        {
            info!(%username, "admin account already present, skipping bootstrap");
            return Ok(None);
        }

        let password_hash = self.hash_password(password)?;
        let user = self
            .repo
            .create_user(NewUser {
                first_name: "Site".to_string(),
                last_name: "Admin".to_string(),
                email,
                username,
                password_hash,
                is_admin: true,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "admin account created");
        Ok(Some(user))
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn issue(&self, user: &User) -> Result<IssuedToken, DomainError> {
        self.jwt
            .issue(user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
