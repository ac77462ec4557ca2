//! Row parsing utilities shared by the route handlers.
//!
//! SQLite stores uuids, dates and decimals as TEXT; these helpers convert
//! them back with a `Database` error on corruption instead of a panic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub fn get_uuid(r: &SqliteRow, col: &str) -> AppResult<Uuid> {
    let s: String = r.get(col);
    Uuid::parse_str(&s).map_err(|e| AppError::Database(format!("invalid uuid in column {}: {}", col, e)))
}

pub fn get_opt_uuid(r: &SqliteRow, col: &str) -> AppResult<Option<Uuid>> {
    let s: Option<String> = r.get(col);
    match s {
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(|e| AppError::Database(format!("invalid uuid in column {}: {}", col, e))),
        None => Ok(None),
    }
}

pub fn get_decimal(r: &SqliteRow, col: &str) -> AppResult<Decimal> {
    let s: String = r.get(col);
    Decimal::from_str(&s)
        .map_err(|e| AppError::Database(format!("invalid decimal in column {}: {}", col, e)))
}

pub fn get_date(r: &SqliteRow, col: &str) -> AppResult<NaiveDate> {
    let s: String = r.get(col);
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| AppError::Database(format!("invalid date in column {}: {}", col, e)))
}

pub fn get_status<T>(r: &SqliteRow, col: &str) -> AppResult<T>
where
    T: FromStr<Err = crate::models::UnknownStatus>,
{
    let s: String = r.get(col);
    s.parse::<T>().map_err(AppError::from)
}

/// Current UTC time in the same ISO form the DB defaults use.
pub fn now_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
