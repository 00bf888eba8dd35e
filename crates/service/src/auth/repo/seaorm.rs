use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use models::user::{self, Profile};

use crate::auth::domain::AuthUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::{NewUserRecord, UserRepository};

/// SeaORM-backed user repository.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(m: user::Model) -> Result<AuthUser, AuthError> {
    let profile = Profile::parse(&m.profile)?;
    Ok(AuthUser { id: m.id, email: m.email, name: m.name, profile })
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        match user::find_by_email(&self.db, email).await? {
            Some(m) => Ok(Some(to_auth_user(m)?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, record: NewUserRecord) -> Result<AuthUser, AuthError> {
        let created = user::create(
            &self.db,
            &record.email,
            &record.name,
            &record.password_hash,
            &record.postal_code,
            record.linkedin.as_deref(),
            record.profile,
        )
        .await?;
        to_auth_user(created)
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Db(e.to_string()))?;
        Ok(found.map(|m| m.password_hash))
    }
}
