use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{book, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub postal_code: String,
    pub linkedin: Option<String>,
    pub profile: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Book,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Book => Entity::has_many(book::Entity).into(),
        }
    }
}

impl Related<book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Access level. Only administrators may approve donated books.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    User,
    Admin,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::User => "user",
            Profile::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, errors::ModelError> {
        match s {
            "user" => Ok(Profile::User),
            "admin" => Ok(Profile::Admin),
            other => Err(errors::ModelError::Validation(format!("unknown profile: {other}"))),
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if email.trim().is_empty() {
        return Err(errors::ModelError::Validation("email is required".into()));
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(errors::ModelError::Validation("email is not a valid address".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name is required".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), errors::ModelError> {
    if password.is_empty() {
        return Err(errors::ModelError::Validation("password is required".into()));
    }
    if password.len() < 8 {
        return Err(errors::ModelError::Validation("password too short (>=8)".into()));
    }
    Ok(())
}

pub fn validate_postal_code(postal_code: &str) -> Result<(), errors::ModelError> {
    if postal_code.trim().is_empty() {
        return Err(errors::ModelError::Validation("postal code is required".into()));
    }
    Ok(())
}

pub fn validate_linkedin(linkedin: Option<&str>) -> Result<(), errors::ModelError> {
    if let Some(url) = linkedin {
        if url.len() > 255 {
            return Err(errors::ModelError::Validation("linkedin address too long".into()));
        }
    }
    Ok(())
}

/// Insert a new user row. The caller supplies an already-hashed password.
pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    password_hash: &str,
    postal_code: &str,
    linkedin: Option<&str>,
    profile: Profile,
) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    validate_postal_code(postal_code)?;
    validate_linkedin(linkedin)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        password_hash: Set(password_hash.to_string()),
        postal_code: Set(postal_code.to_string()),
        linkedin: Set(linkedin.map(str::to_string)),
        profile: Set(profile.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_presence_and_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@localhost").is_err());
    }

    #[test]
    fn name_and_postal_code_required() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_postal_code("01310-100").is_ok());
        assert!(validate_postal_code("").is_err());
    }

    #[test]
    fn password_required_with_min_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn linkedin_is_optional() {
        assert!(validate_linkedin(None).is_ok());
        assert!(validate_linkedin(Some("https://linkedin.com/in/alice")).is_ok());
        let long = "x".repeat(300);
        assert!(validate_linkedin(Some(&long)).is_err());
    }

    #[test]
    fn profile_round_trip() {
        assert_eq!(Profile::parse("user").unwrap(), Profile::User);
        assert_eq!(Profile::parse("admin").unwrap(), Profile::Admin);
        assert!(Profile::parse("root").is_err());
        assert_eq!(Profile::Admin.as_str(), "admin");
    }
}
