use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use crate::models::NewRun;
use crate::schema::Runs;

const RUN_COLUMNS: [Runs; 10] = [
    Runs::Id,
    Runs::Date,
    Runs::TimeStarted,
    Runs::TimeEnded,
    Runs::TotalTime,
    Runs::Distance,
    Runs::AvgPace,
    Runs::ElevationGain,
    Runs::Location,
    Runs::EffortLevel,
];

/// INSERT INTO runs (user_id, date, time_started, ...) VALUES (?, ?, ?, ...)
pub fn insert(user_id: &str, run: &NewRun) -> String {
    Query::insert()
        .into_table(Runs::Table)
        .columns([
            Runs::UserId,
            Runs::Date,
            Runs::TimeStarted,
            Runs::TimeEnded,
            Runs::TotalTime,
            Runs::Distance,
            Runs::AvgPace,
            Runs::ElevationGain,
            Runs::Location,
            Runs::EffortLevel,
        ])
        .values_panic([
            user_id.into(),
            run.date.as_str().into(),
            run.time_started.as_str().into(),
            run.time_ended.as_str().into(),
            run.total_time.as_str().into(),
            run.distance.as_str().into(),
            run.avg_pace.as_str().into(),
            run.elevation_gain.as_str().into(),
            run.location.as_str().into(),
            run.effort_level.into(),
        ])
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, date, ... FROM runs WHERE user_id = ? ORDER BY date DESC
pub fn select_by_user(user_id: &str) -> String {
    Query::select()
        .columns(RUN_COLUMNS)
        .from(Runs::Table)
        .and_where(Expr::col(Runs::UserId).eq(user_id))
        .order_by(Runs::Date, Order::Desc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, date, ... FROM runs WHERE id = ? AND user_id = ?
pub fn select_by_id(id: i64, user_id: &str) -> String {
    Query::select()
        .columns(RUN_COLUMNS)
        .from(Runs::Table)
        .and_where(Expr::col(Runs::Id).eq(id))
        .and_where(Expr::col(Runs::UserId).eq(user_id))
        .to_string(SqliteQueryBuilder)
}
