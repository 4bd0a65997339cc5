use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use crate::schema::Runners;

/// INSERT OR IGNORE INTO runners (user_id) VALUES (?)
pub fn insert_or_ignore(user_id: &str) -> String {
    Query::insert()
        .into_table(Runners::Table)
        .columns([Runners::UserId])
        .values_panic([user_id.into()])
        .on_conflict(OnConflict::new().do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}

/// SELECT 1 FROM runners WHERE user_id = ?
pub fn exists(user_id: &str) -> String {
    Query::select()
        .expr(Expr::val(1))
        .from(Runners::Table)
        .and_where(Expr::col(Runners::UserId).eq(user_id))
        .to_string(SqliteQueryBuilder)
}
