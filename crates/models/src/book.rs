use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    /// Normalized stored file name, `{id}.{ext}`.
    pub image: String,
    pub freight_option: String,
    pub approved: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Shipping-cost arrangement attached to a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightOption {
    City,
    State,
    Country,
    World,
    WithoutFreight,
}

impl FreightOption {
    pub const ALL: [FreightOption; 5] = [
        FreightOption::City,
        FreightOption::State,
        FreightOption::Country,
        FreightOption::World,
        FreightOption::WithoutFreight,
    ];

    /// Machine value persisted in the `freight_option` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            FreightOption::City => "city",
            FreightOption::State => "state",
            FreightOption::Country => "country",
            FreightOption::World => "world",
            FreightOption::WithoutFreight => "without_freight",
        }
    }

    /// Human label shown in listing forms.
    pub fn label(&self) -> &'static str {
        match self {
            FreightOption::City => "Ships within my city",
            FreightOption::State => "Ships within my state",
            FreightOption::Country => "Ships anywhere in the country",
            FreightOption::World => "Ships worldwide",
            FreightOption::WithoutFreight => "No freight included",
        }
    }

    pub fn parse(s: &str) -> Result<Self, errors::ModelError> {
        match s.to_ascii_lowercase().as_str() {
            "city" => Ok(FreightOption::City),
            "state" => Ok(FreightOption::State),
            "country" => Ok(FreightOption::Country),
            "world" => Ok(FreightOption::World),
            "without_freight" => Ok(FreightOption::WithoutFreight),
            other => {
                Err(errors::ModelError::Validation(format!("unknown freight option: {other}")))
            }
        }
    }
}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() {
        return Err(errors::ModelError::Validation("title is required".into()));
    }
    Ok(())
}

pub fn validate_author(author: &str) -> Result<(), errors::ModelError> {
    if author.trim().is_empty() {
        return Err(errors::ModelError::Validation("author is required".into()));
    }
    Ok(())
}

pub fn validate_image(image: &str) -> Result<(), errors::ModelError> {
    if image.trim().is_empty() {
        return Err(errors::ModelError::Validation("image is required".into()));
    }
    Ok(())
}

/// Insert a book row. The id is chosen by the caller because the stored
/// image name is derived from it before persistence.
pub async fn create(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
    title: &str,
    author: &str,
    image: &str,
    freight_option: FreightOption,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    validate_author(author)?;
    validate_image(image)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        title: Set(title.to_string()),
        author: Set(author.to_string()),
        image: Set(image.to_string()),
        freight_option: Set(freight_option.as_str().to_string()),
        approved: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
