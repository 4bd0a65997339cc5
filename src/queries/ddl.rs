use sea_query::{ColumnDef, Expr, ForeignKey, ForeignKeyAction, Index, SqliteQueryBuilder, Table};

use crate::schema::{Metadata, Runners, Runs, Sessions, Users};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).string().primary_key())
        .col(ColumnDef::new(Metadata::Value).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS users (
///     id TEXT PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     username TEXT,
///     password_hash TEXT NOT NULL,
///     password_salt TEXT NOT NULL,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// )
pub fn create_users_table() -> String {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(ColumnDef::new(Users::Id).string().primary_key())
        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
        .col(ColumnDef::new(Users::Username).string())
        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
        .col(ColumnDef::new(Users::PasswordSalt).string().not_null())
        .col(
            ColumnDef::new(Users::CreatedAt)
                .string()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS sessions (
///     token TEXT PRIMARY KEY,
///     user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// )
pub fn create_sessions_table() -> String {
    Table::create()
        .table(Sessions::Table)
        .if_not_exists()
        .col(ColumnDef::new(Sessions::Token).string().primary_key())
        .col(ColumnDef::new(Sessions::UserId).string().not_null())
        .col(
            ColumnDef::new(Sessions::CreatedAt)
                .string()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Sessions::Table, Sessions::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS runners (
///     user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     provisioned_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// )
pub fn create_runners_table() -> String {
    Table::create()
        .table(Runners::Table)
        .if_not_exists()
        .col(ColumnDef::new(Runners::UserId).string().primary_key())
        .col(
            ColumnDef::new(Runners::ProvisionedAt)
                .string()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Runners::Table, Runners::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS runs (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id TEXT NOT NULL REFERENCES runners(user_id) ON DELETE CASCADE,
///     date TEXT NOT NULL,
///     time_started TEXT NOT NULL,
///     time_ended TEXT NOT NULL,
///     total_time TEXT NOT NULL,
///     distance TEXT NOT NULL,
///     avg_pace TEXT NOT NULL,
///     elevation_gain TEXT NOT NULL,
///     location TEXT NOT NULL,
///     effort_level INTEGER NOT NULL,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// )
pub fn create_runs_table() -> String {
    Table::create()
        .table(Runs::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Runs::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Runs::UserId).string().not_null())
        .col(ColumnDef::new(Runs::Date).string().not_null())
        .col(ColumnDef::new(Runs::TimeStarted).string().not_null())
        .col(ColumnDef::new(Runs::TimeEnded).string().not_null())
        .col(ColumnDef::new(Runs::TotalTime).string().not_null())
        .col(ColumnDef::new(Runs::Distance).string().not_null())
        .col(ColumnDef::new(Runs::AvgPace).string().not_null())
        .col(ColumnDef::new(Runs::ElevationGain).string().not_null())
        .col(ColumnDef::new(Runs::Location).string().not_null())
        .col(ColumnDef::new(Runs::EffortLevel).integer().not_null())
        .col(
            ColumnDef::new(Runs::CreatedAt)
                .string()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Runs::Table, Runs::UserId)
                .to(Runners::Table, Runners::UserId)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_runs_user_date ON runs(user_id, date)
pub fn create_runs_user_date_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_runs_user_date")
        .table(Runs::Table)
        .col(Runs::UserId)
        .col(Runs::Date)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)
pub fn create_sessions_user_id_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_sessions_user_id")
        .table(Sessions::Table)
        .col(Sessions::UserId)
        .to_string(SqliteQueryBuilder)
}
