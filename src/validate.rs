//! Client side form checks, run before any request is sent.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Error;

/// Tolerance for the binary representation error of decimal input, `0.3 * 10` is not exactly 3.
const TENTHS_EPSILON: f64 = 1e-9;

/// Parse a years-of-experience field.
///
/// An empty field means "not specified".
/// Anything else must be a finite number of at least 0.1 with at most one decimal.
pub fn years_of_experience(input: &str) -> Result<Option<f64>, Error> {
	let input = input.trim();
	if input.is_empty() {
		return Ok(None);
	}

	let invalid = || Error::Validation("経験年数は0.1以上、0.1刻みの数値で入力してください".to_string());

	// Plain decimal notation with at most one significant fractional digit.
	let (_, fraction) = input.split_once('.').unwrap_or((input, ""));
	let plain = input.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'));
	if !plain || fraction.trim_end_matches('0').len() > 1 {
		return Err(invalid());
	}

	let value: f64 = input.parse().map_err(|_| invalid())?;
	if !value.is_finite() || value < 0.1 - TENTHS_EPSILON {
		return Err(invalid());
	}

	let tenths = value * 10.0;
	if (tenths - tenths.round()).abs() > TENTHS_EPSILON {
		return Err(invalid());
	}

	Ok(Some(tenths.round() / 10.0))
}

pub fn proficiency(value: u8) -> Result<u8, Error> {
	if (1..=5).contains(&value) {
		Ok(value)
	} else {
		Err(Error::Validation("習熟度は1～5で入力してください".to_string()))
	}
}

pub fn difficulty(input: &str) -> Result<u8, Error> {
	input.trim()
		.parse::<u8>()
		.ok()
		.filter(|value| (1..=5).contains(value))
		.ok_or_else(|| Error::Validation("難易度は1～5の整数で入力してください".to_string()))
}

/// Check that every named field has a non-blank value.
pub fn required(fields: &[(&str, &str)], message: &str) -> Result<(), Error> {
	match fields.iter().find(|(_name, value)| value.trim().is_empty()) {
		Some((name, _)) => {
			log::debug!("required field is empty: {}", name);
			Err(Error::Validation(message.to_string()))
		},
		None => Ok(()),
	}
}

/// Parse a `yyyy-mm-dd` form date.
pub fn date(input: &str) -> Result<NaiveDate, Error> {
	NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
		.map_err(|_| Error::Validation(format!("日付の形式が不正です (yyyy-mm-dd): {}", input)))
}

/// Parse an optional `yyyy-mm-dd` form date, where an empty field means "not set".
pub fn optional_date(input: &str) -> Result<Option<NaiveDate>, Error> {
	if input.trim().is_empty() {
		Ok(None)
	} else {
		date(input).map(Some)
	}
}

/// Parse a due date, given either as RFC 3339 timestamp or as plain date (midnight UTC).
pub fn due_date(input: &str) -> Result<DateTime<Utc>, Error> {
	let input = input.trim();
	if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
		return Ok(timestamp.with_timezone(&Utc));
	}
	let date = date(input)?;
	Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
