use serde::Serialize;
use sqlx::prelude::Type;
use uuid::Uuid;

pub mod handler;

#[derive(Debug, Clone, Copy, Serialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
}

#[derive(Debug, Clone, Copy, Type, PartialEq, Eq)]
#[sqlx(type_name = "like_target_kind", rename_all = "lowercase")]
pub enum LikeTargetKind {
    Post,
    Comment,
}

/// The liked entity a notification points at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum LikeTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl LikeTarget {
    pub fn kind(&self) -> LikeTargetKind {
        match self {
            LikeTarget::Post(_) => LikeTargetKind::Post,
            LikeTarget::Comment(_) => LikeTargetKind::Comment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub from_user: Option<String>,
    pub target: LikeTarget,
    pub is_read: bool,
    pub created_at: String,
}

/// Queue a like notification for the owner of the liked entity.
///
/// Runs inside the caller's transaction so the like and its notification
/// commit together.
pub async fn record_like(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    to_user_id: Uuid,
    from_user_id: Uuid,
    target: LikeTarget,
) -> Result<(), sqlx::Error> {
    let (post_id, comment_id) = match target {
        LikeTarget::Post(id) => (Some(id), None),
        LikeTarget::Comment(id) => (None, Some(id)),
    };

    sqlx::query(
        r#"
        INSERT INTO notifications (id, kind, to_user_id, from_user_id, target_kind, post_id, comment_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(NotificationKind::Like)
    .bind(to_user_id)
    .bind(from_user_id)
    .bind(target.kind())
    .bind(post_id)
    .bind(comment_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn like_target_serializes_as_tagged_union() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(LikeTarget::Post(id)).unwrap(),
            json!({ "type": "post", "id": id })
        );
        assert_eq!(
            serde_json::to_value(LikeTarget::Comment(id)).unwrap(),
            json!({ "type": "comment", "id": id })
        );
    }

    #[test]
    fn target_kind_follows_the_variant() {
        let id = Uuid::new_v4();
        assert_eq!(LikeTarget::Post(id).kind(), LikeTargetKind::Post);
        assert_eq!(LikeTarget::Comment(id).kind(), LikeTargetKind::Comment);
    }
}
