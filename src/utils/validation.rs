use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles");
    static ref URL_RE: Regex =
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url regex compiles");
}

pub fn validate_required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.trim().chars().count();
    if len < min {
        if min == 1 {
            return Err(AppError::bad_request(format!("{} must not be empty", field)));
        }
        return Err(AppError::bad_request(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if len > max {
        return Err(AppError::bad_request(format!(
            "{} must not exceed {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(AppError::bad_request("email must be a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_url(field: &str, url: &str) -> AppResult<()> {
    if !URL_RE.is_match(url) {
        return Err(AppError::bad_request(format!("{} must be an http(s) URL", field)));
    }
    Ok(())
}

/// Lower-cases and trims an email so lookups and the unique index agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
