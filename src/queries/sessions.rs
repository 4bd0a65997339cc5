use sea_query::{Expr, Query, SqliteQueryBuilder};

use crate::schema::{Sessions, Users};

/// INSERT INTO sessions (token, user_id) VALUES (?, ?)
pub fn insert(token: &str, user_id: &str) -> String {
    Query::insert()
        .into_table(Sessions::Table)
        .columns([Sessions::Token, Sessions::UserId])
        .values_panic([token.into(), user_id.into()])
        .to_string(SqliteQueryBuilder)
}

/// SELECT users.id, users.email, users.username
/// FROM sessions INNER JOIN users ON users.id = sessions.user_id
/// WHERE sessions.token = ? AND sessions.created_at >= ?
///
/// `not_before` uses SQLite's `CURRENT_TIMESTAMP` format (`YYYY-MM-DD HH:MM:SS`, UTC)
pub fn select_user_by_token(token: &str, not_before: &str) -> String {
    Query::select()
        .column((Users::Table, Users::Id))
        .column((Users::Table, Users::Email))
        .column((Users::Table, Users::Username))
        .from(Sessions::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id)).equals((Sessions::Table, Sessions::UserId)),
        )
        .and_where(Expr::col((Sessions::Table, Sessions::Token)).eq(token))
        .and_where(Expr::col((Sessions::Table, Sessions::CreatedAt)).gte(not_before))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM sessions WHERE token = ?
pub fn delete(token: &str) -> String {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::Token).eq(token))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM sessions WHERE created_at < ?
pub fn delete_created_before(cutoff: &str) -> String {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::CreatedAt).lt(cutoff))
        .to_string(SqliteQueryBuilder)
}
