use rand::Rng;

/// Expected local database schema version
pub const EXPECTED_DB_VERSION: &str = "1";

/// Cookie carrying the signed-in session's access token
pub const SESSION_COOKIE: &str = "brisk_session";

/// Where a successful login lands
pub const RUNS_ROUTE: &str = "/runs";

pub const DEFAULT_PORT: u16 = 3000;

/// Random alphanumeric string, used for session tokens and password salts
pub fn generate_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
