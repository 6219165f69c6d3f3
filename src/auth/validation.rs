/// 가입 입력 검증
use crate::error::AppError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 8;

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if (USERNAME_MIN..=USERNAME_MAX).contains(&len) && allowed {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "INVALID_USERNAME",
            format!("username must be {USERNAME_MIN}-{USERNAME_MAX} letters, digits, '_', '-' or '.'"),
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request("INVALID_EMAIL", "invalid email address"))
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() >= PASSWORD_MIN {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "WEAK_PASSWORD",
            format!("password must be at least {PASSWORD_MIN} characters"),
        ))
    }
}
