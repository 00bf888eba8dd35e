use async_trait::async_trait;
use models::user::Profile;
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

/// New user record as persisted (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub postal_code: String,
    pub linkedin: Option<String>,
    pub profile: Profile,
}

/// Repository abstraction for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, record: NewUserRecord) -> Result<AuthUser, AuthError>;
    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        hashes: Mutex<HashMap<Uuid, String>>,    // key: user_id
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn create_user(&self, record: NewUserRecord) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&record.email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: record.email.clone(),
                name: record.name,
                profile: record.profile,
            };
            users.insert(record.email, user.clone());
            self.hashes.lock().unwrap().insert(user.id, record.password_hash);
            Ok(user)
        }

        async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let hashes = self.hashes.lock().unwrap();
            Ok(hashes.get(&user_id).cloned())
        }
    }
}
