pub mod admin;
pub mod auctions;
pub mod payments;
pub mod queries;
pub mod resources;
pub mod search;
pub mod services;
pub mod uploads;
pub mod users;

/// 유니크 제약 위반이면 제약 이름 반환
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
