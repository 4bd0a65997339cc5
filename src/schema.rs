use sea_query::Iden;

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Users table - accounts of the local backend
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Email,
    Username,
    PasswordHash,
    PasswordSalt,
    CreatedAt,
}

/// Sessions table - access tokens handed out at sign-in
#[derive(Iden)]
pub enum Sessions {
    Table,
    Token,
    UserId,
    CreatedAt,
}

/// Runners table - users whose run storage has been provisioned
#[derive(Iden)]
pub enum Runners {
    Table,
    UserId,
    ProvisionedAt,
}

/// Runs table - one row per logged run, keyed by owner
#[derive(Iden)]
pub enum Runs {
    Table,
    Id,
    UserId,
    Date,
    TimeStarted,
    TimeEnded,
    TotalTime,
    Distance,
    AvgPace,
    ElevationGain,
    Location,
    EffortLevel,
    CreatedAt,
}
