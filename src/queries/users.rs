use sea_query::{Expr, Query, SqliteQueryBuilder};

use crate::schema::Users;

/// INSERT INTO users (id, email, username, password_hash, password_salt) VALUES (?, ?, ?, ?, ?)
pub fn insert(
    id: &str,
    email: &str,
    username: Option<&str>,
    password_hash: &str,
    password_salt: &str,
) -> String {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Email,
            Users::Username,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .values_panic([
            id.into(),
            email.into(),
            username.map(str::to_string).into(),
            password_hash.into(),
            password_salt.into(),
        ])
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, email, username, password_hash, password_salt FROM users WHERE email = ?
pub fn select_credentials_by_email(email: &str) -> String {
    Query::select()
        .columns([
            Users::Id,
            Users::Email,
            Users::Username,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .to_string(SqliteQueryBuilder)
}

/// SELECT 1 FROM users WHERE email = ?
pub fn exists_by_email(email: &str) -> String {
    Query::select()
        .expr(Expr::val(1))
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .to_string(SqliteQueryBuilder)
}
