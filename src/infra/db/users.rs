use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::{
        pagination::{OffsetPage, OffsetRequest},
        repos::{CreateUserParams, RepoError, UserQueryFilter, UsersRepo, UsersWriteRepo},
    },
    domain::entities::UserListRecord,
};

use super::{PostgresRepositories, escape_like, fetch_list_page, map_sqlx_error};

const USER_LIST_SELECT: &str = "SELECT u.id AS id, u.user_email, u.created_at, u.updated_at, \
    ur.role_text AS role_text, \
    (SELECT COUNT(*) FROM users_address ua WHERE ua.user_id = u.id) AS address_count \
    FROM users u \
    LEFT JOIN user_roles ur ON ur.user_id = u.id";

const USER_COUNT_SELECT: &str = "SELECT COUNT(*) FROM users u";

const EMAIL_FILTER: &str = r" WHERE u.user_email ILIKE $1 ESCAPE '\'";

#[derive(sqlx::FromRow)]
struct UserListRow {
    id: i64,
    user_email: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    role_text: Option<String>,
    address_count: i64,
}

impl From<UserListRow> for UserListRecord {
    fn from(row: UserListRow) -> Self {
        Self {
            id: row.id,
            user_email: row.user_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
            role_text: row.role_text,
            address_count: row.address_count,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn list_users(
        &self,
        filter: &UserQueryFilter,
        page: OffsetRequest,
    ) -> Result<OffsetPage<UserListRecord>, RepoError> {
        match filter.email.as_deref() {
            Some(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                fetch_list_page::<UserListRow, _>(
                    self.pool(),
                    &format!("{USER_LIST_SELECT}{EMAIL_FILTER}"),
                    &format!("{USER_COUNT_SELECT}{EMAIL_FILTER}"),
                    &[pattern],
                    page,
                )
                .await
            }
            None => {
                fetch_list_page::<UserListRow, _>(
                    self.pool(),
                    USER_LIST_SELECT,
                    USER_COUNT_SELECT,
                    &[],
                    page,
                )
                .await
            }
        }
    }
}

#[async_trait]
impl UsersWriteRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (user_email, password, user_info)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&params.email)
        .bind(&params.password)
        .bind(&params.user_info)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM users_address WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn update_password(&self, user_id: i64, password: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password = $1,
                updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(password)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn upsert_role(&self, user_id: i64, role_text: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_text)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET role_text = EXCLUDED.role_text,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(role_text)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn clear_role(&self, user_id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
