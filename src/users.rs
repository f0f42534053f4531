//! Account lifecycle: registration, login, profile reads and updates, password changes.

use std::sync::Arc;

use tokio::sync::OnceCell;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    present, supplied, AuthenticatedUser, LoginRequest, PasswordChangeRequest, PasswordHasher,
    ProfileUpdateRequest, RegisterRequest, TokenService,
};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{normalize_email, NewUser, Profile, PublicUser};

const LOGIN_FAILED: &str = "Invalid email or password";

/// A freshly issued token together with the account it belongs to.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct UserDirectory {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
    /// Verified against when the email is unknown, so both login failures cost one hash check.
    decoy_hash: Arc<OnceCell<String>>,
}

impl UserDirectory {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Session, AppError> {
        let (Some(name), Some(_), Some(password)) =
            (present(&req.name), present(&req.email), supplied(&req.password))
        else {
            return Err(AppError::ValidationError("All fields are required".into()));
        };
        req.validate()?;

        let email = normalize_email(req.email.as_deref().unwrap_or_default());
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = self
            .repo
            .insert(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;
        log::info!("registered user {}", user.id);

        Ok(Session {
            token: self.tokens.issue(user.id)?,
            user: user.to_public(),
        })
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn authenticate(&self, req: LoginRequest) -> Result<Session, AppError> {
        let (Some(email), Some(password)) = (present(&req.email), supplied(&req.password)) else {
            return Err(AppError::ValidationError(
                "Email and password are required".into(),
            ));
        };

        let Some(user) = self.repo.find_by_email(&normalize_email(email)).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| self.hasher.hash("decoy-password-for-timing"))
                .await?;
            self.hasher.verify(password, decoy).await?;
            return Err(AppError::InvalidCredentials(LOGIN_FAILED.into()));
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            log::debug!("failed login for user {}", user.id);
            return Err(AppError::InvalidCredentials(LOGIN_FAILED.into()));
        }

        Ok(Session {
            token: self.tokens.issue(user.id)?,
            user: user.to_public(),
        })
    }

    pub async fn get_profile(&self, caller: AuthenticatedUser) -> Result<Profile, AppError> {
        let user = self.find(caller.user_id()).await?;
        Ok(user.to_profile())
    }

    pub async fn update_profile(
        &self,
        caller: AuthenticatedUser,
        mut req: ProfileUpdateRequest,
    ) -> Result<PublicUser, AppError> {
        let (Some(name), Some(_)) = (present(&req.name), present(&req.email)) else {
            return Err(AppError::ValidationError("Name and email are required".into()));
        };
        let name = name.trim().to_string();
        if supplied(&req.password).is_none() {
            req.password = None;
        }
        req.validate()?;

        let password_hash = match req.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };
        let email = normalize_email(req.email.as_deref().unwrap_or_default());

        let user = self
            .repo
            .update_profile(caller.user_id(), &name, &email, password_hash.as_deref())
            .await?
            .ok_or_else(user_not_found)?;
        Ok(user.to_public())
    }

    pub async fn change_password(
        &self,
        caller: AuthenticatedUser,
        req: PasswordChangeRequest,
    ) -> Result<(), AppError> {
        let (Some(current), Some(new)) =
            (supplied(&req.current_password), supplied(&req.new_password))
        else {
            return Err(AppError::ValidationError(
                "Current password and new password are required".into(),
            ));
        };
        req.validate()?;

        let user = self.find(caller.user_id()).await?;
        if !self.hasher.verify(current, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials(
                "Current password is incorrect".into(),
            ));
        }

        let password_hash = self.hasher.hash(new).await?;
        if !self.repo.update_password(user.id, &password_hash).await? {
            return Err(user_not_found());
        }
        log::info!("password changed for user {}", user.id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<crate::models::User, AppError> {
        self.repo.find_by_id(id).await?.ok_or_else(user_not_found)
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserRepository;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "user_directory_test_secret_0123456789";

    fn directory() -> UserDirectory {
        UserDirectory::new(
            Arc::new(MemoryUserRepository::new()),
            PasswordHasher::new(4),
            TokenService::new(SECRET),
        )
    }

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Ann".into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn message(err: AppError) -> (String, String) {
        let kind = format!("{:?}", err)
            .split('(')
            .next()
            .unwrap_or_default()
            .to_string();
        (kind, err.public_message().to_string())
    }

    #[actix_rt::test]
    async fn test_register_issues_verifiable_token() {
        let users = directory();
        let session = users
            .register(register_req("ann@x.com", "longenough1"))
            .await
            .unwrap();

        assert_eq!(session.user.email, "ann@x.com");
        let user_id = TokenService::new(SECRET).verify(&session.token).unwrap();
        assert_eq!(user_id, session.user.id);
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let users = directory();

        let missing = users
            .register(RegisterRequest {
                name: None,
                ..register_req("ann@x.com", "longenough1")
            })
            .await;
        assert!(matches!(missing, Err(AppError::ValidationError(m)) if m == "All fields are required"));

        let bad_email = users.register(register_req("not-an-email", "longenough1")).await;
        assert!(matches!(bad_email, Err(AppError::ValidationError(m)) if m == "Invalid email format"));

        let short = users.register(register_req("ann@x.com", "short")).await;
        assert!(matches!(short, Err(AppError::ValidationError(_))));
    }

    #[actix_rt::test]
    async fn test_whitespace_password_is_a_real_password() {
        let users = directory();
        let spaces = "        ";
        users
            .register(register_req("ann@x.com", spaces))
            .await
            .unwrap();

        assert!(users.authenticate(login_req("ann@x.com", spaces)).await.is_ok());
        assert!(users
            .authenticate(login_req("ann@x.com", "         "))
            .await
            .is_err());

        let empty = users.register(register_req("bob@x.com", "")).await;
        assert!(matches!(empty, Err(AppError::ValidationError(m)) if m == "All fields are required"));
    }

    #[actix_rt::test]
    async fn test_register_twice_is_conflict_regardless_of_case() {
        let users = directory();
        users
            .register(register_req("ann@x.com", "longenough1"))
            .await
            .unwrap();

        let again = users.register(register_req("ann@x.com", "longenough1")).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));

        let shouting = users.register(register_req("ANN@X.COM", "longenough1")).await;
        assert!(matches!(shouting, Err(AppError::Conflict(_))));
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        let users = directory();
        users
            .register(register_req("ann@x.com", "longenough1"))
            .await
            .unwrap();

        let wrong_password = users
            .authenticate(login_req("ann@x.com", "not-the-password"))
            .await
            .unwrap_err();
        let unknown_email = users
            .authenticate(login_req("nobody@x.com", "not-the-password"))
            .await
            .unwrap_err();

        assert_eq!(message(wrong_password), message(unknown_email));
    }

    #[actix_rt::test]
    async fn test_login_is_case_insensitive_on_email() {
        let users = directory();
        users
            .register(register_req("ann@x.com", "longenough1"))
            .await
            .unwrap();

        let session = users
            .authenticate(login_req("Ann@X.com", "longenough1"))
            .await
            .unwrap();
        assert_eq!(session.user.name, "Ann");
    }

    #[actix_rt::test]
    async fn test_profile_update_and_password_change() {
        let users = directory();
        let session = users
            .register(register_req("ann@x.com", "longenough1"))
            .await
            .unwrap();
        let caller = AuthenticatedUser::new(session.user.id);

        let updated = users
            .update_profile(
                caller,
                ProfileUpdateRequest {
                    name: Some("Annie".into()),
                    email: Some("annie@x.com".into()),
                    password: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Annie");
        assert_eq!(
            users.get_profile(caller).await.unwrap(),
            Profile {
                name: "Annie".into(),
                email: "annie@x.com".into()
            }
        );

        let wrong_current = users
            .change_password(
                caller,
                PasswordChangeRequest {
                    current_password: Some("not-it-at-all".into()),
                    new_password: Some("brandnewpass".into()),
                },
            )
            .await;
        assert!(matches!(wrong_current, Err(AppError::InvalidCredentials(_))));

        let too_short = users
            .change_password(
                caller,
                PasswordChangeRequest {
                    current_password: Some("longenough1".into()),
                    new_password: Some("short".into()),
                },
            )
            .await;
        assert!(matches!(too_short, Err(AppError::ValidationError(_))));

        users
            .change_password(
                caller,
                PasswordChangeRequest {
                    current_password: Some("longenough1".into()),
                    new_password: Some("brandnewpass".into()),
                },
            )
            .await
            .unwrap();

        assert!(users
            .authenticate(login_req("annie@x.com", "longenough1"))
            .await
            .is_err());
        assert!(users
            .authenticate(login_req("annie@x.com", "brandnewpass"))
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_profile_of_missing_user_is_not_found() {
        let users = directory();
        let ghost = AuthenticatedUser::new(Uuid::new_v4());
        assert!(matches!(
            users.get_profile(ghost).await,
            Err(AppError::NotFound(_))
        ));
    }
}
