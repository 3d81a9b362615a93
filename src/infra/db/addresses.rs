use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{AddressesRepo, RepoError},
    domain::entities::AddressRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct BoundAddressRow {
    id: i64,
    name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    mail_count: i64,
    send_count: i64,
}

impl From<BoundAddressRow> for AddressRecord {
    fn from(row: BoundAddressRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            mail_count: row.mail_count,
            send_count: row.send_count,
        }
    }
}

#[async_trait]
impl AddressesRepo for PostgresRepositories {
    async fn list_bound_addresses(&self, user_id: i64) -> Result<Vec<AddressRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BoundAddressRow>(
            r#"
            SELECT a.id,
                   a.name,
                   a.created_at,
                   a.updated_at,
                   (SELECT COUNT(*) FROM raw_mails m WHERE m.address = a.name) AS mail_count,
                   (SELECT COUNT(*) FROM sendbox s WHERE s.address = a.name) AS send_count
            FROM address a
            JOIN users_address ua ON ua.address_id = a.id
            WHERE ua.user_id = $1
            ORDER BY a.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AddressRecord::from).collect())
    }
}
