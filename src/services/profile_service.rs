use crate::dto::profile_dto::{CreateProfilePayload, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::models::profile::Profile;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Created once at signup with the auth subject as the id.
    pub async fn create(&self, user_id: Uuid, payload: CreateProfilePayload) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, username, full_name, avatar_url, phone, bio)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&payload.username)
        .bind(&payload.full_name)
        .bind(&payload.avatar_url)
        .bind(&payload.phone)
        .bind(&payload.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("Profile already exists or username is taken".to_string())
            }
            _ => Error::from(e),
        })?;

        Ok(profile)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(r#"SELECT * FROM profiles WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        profile.ok_or_else(|| Error::NotFound("Profile not found".to_string()))
    }

    /// A profile is only ever edited by its own user.
    pub async fn update_own(
        &self,
        id: Uuid,
        actor_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        if id != actor_id {
            return Err(Error::Forbidden(
                "You can only edit your own profile".to_string(),
            ));
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET
                username = COALESCE($2, username),
                full_name = COALESCE($3, full_name),
                avatar_url = COALESCE($4, avatar_url),
                phone = COALESCE($5, phone),
                bio = COALESCE($6, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.username)
        .bind(&payload.full_name)
        .bind(&payload.avatar_url)
        .bind(&payload.phone)
        .bind(&payload.bio)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
