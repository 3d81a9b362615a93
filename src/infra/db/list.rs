//! Offset-paginated listing shared by admin queries.

use sqlx::{FromRow, PgPool, postgres::PgRow};

use crate::application::{
    pagination::{OffsetPage, OffsetRequest},
    repos::RepoError,
};

use super::map_sqlx_error;

/// Escape `%`, `_` and `\` so `needle` matches literally inside a
/// `LIKE … ESCAPE '\'` pattern.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Run a paginated listing.
///
/// `row_sql` and `count_sql` share the positional parameters `$1..$n` bound
/// from `params`. Rows come back newest id first; the total is counted with
/// the same filter.
pub async fn fetch_list_page<R, T>(
    pool: &PgPool,
    row_sql: &str,
    count_sql: &str,
    params: &[String],
    page: OffsetRequest,
) -> Result<OffsetPage<T>, RepoError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    T: From<R>,
{
    let limit_idx = params.len() + 1;
    let offset_idx = params.len() + 2;
    let paged_sql = format!("{row_sql} ORDER BY id DESC LIMIT ${limit_idx} OFFSET ${offset_idx}");

    let mut rows_query = sqlx::query_as::<_, R>(&paged_sql);
    for param in params {
        rows_query = rows_query.bind(param.as_str());
    }
    let rows = rows_query
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?;

    let mut count_query = sqlx::query_scalar::<_, i64>(count_sql);
    for param in params {
        count_query = count_query.bind(param.as_str());
    }
    let count = count_query.fetch_one(pool).await.map_err(map_sqlx_error)?;

    Ok(OffsetPage::new(
        rows.into_iter().map(T::from).collect(),
        count,
    ))
}
