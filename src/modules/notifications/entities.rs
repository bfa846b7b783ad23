//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the actor did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum Verb {
    #[sea_orm(string_value = "started following you")]
    #[serde(rename = "started following you")]
    StartedFollowing,
    #[sea_orm(string_value = "commented on your post")]
    #[serde(rename = "commented on your post")]
    Commented,
    #[sea_orm(string_value = "liked your post")]
    #[serde(rename = "liked your post")]
    Liked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: i64,
    pub verb: Verb,
    /// Kind of object the notification points at, e.g. `post`
    #[sea_orm(nullable)]
    pub target_type: Option<String>,
    #[sea_orm(nullable)]
    pub target_id: Option<i64>,
    pub read: bool,
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "agora_authz::entities::user::Entity",
        from = "Column::RecipientId",
        to = "agora_authz::entities::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
    #[sea_orm(
        belongs_to = "agora_authz::entities::user::Entity",
        from = "Column::ActorId",
        to = "agora_authz::entities::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
