use crate::model::{Priority, DATE_FORMAT};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while checking raw user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid priority '{0}', choose from low, medium, or high")]
    InvalidPriority(String),

    #[error("task description must not be empty")]
    EmptyDescription,

    #[error("'{0}' is not a valid number")]
    NotANumber(String),
}

/// Outcome of reading a due date. A blank answer is not an error: it means
/// the user chose not to give one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Skip,
}

pub fn parse_due_date(raw: &str) -> Result<DateInput, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DateInput::Skip);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(DateInput::Date)
        .map_err(|_| InputError::InvalidDate(raw.to_string()))
}

/// Case insensitive priority. Blank input means the default, medium.
pub fn parse_priority(raw: &str) -> Result<Priority, InputError> {
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(Priority::default()),
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        _ => Err(InputError::InvalidPriority(raw.trim().to_string())),
    }
}

pub fn parse_description(raw: &str) -> Result<String, InputError> {
    let description = raw.trim();
    if description.is_empty() {
        Err(InputError::EmptyDescription)
    } else {
        Ok(description.to_string())
    }
}

/// Parse a 1-based task number as typed by the user. Range checking is
/// left to the view the number refers to.
pub fn parse_selection(raw: &str) -> Result<usize, InputError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| InputError::NotANumber(raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn blank_date_is_skip() {
        assert_eq!(parse_due_date("   "), Ok(DateInput::Skip));
        assert_eq!(parse_due_date(""), Ok(DateInput::Skip));
    }

    #[test]
    fn valid_date_is_parsed() {
        assert_eq!(
            parse_due_date(" 2024-02-29 "),
            Ok(DateInput::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
    }

    #[rstest]
    #[case("2023-02-29")]
    #[case("10/06/2024")]
    #[case("tomorrow")]
    #[case("2024-13-01")]
    fn invalid_dates_are_rejected(#[case] raw: &str) {
        assert_eq!(
            parse_due_date(raw),
            Err(InputError::InvalidDate(raw.to_string()))
        );
    }

    #[rstest]
    #[case("", Priority::Medium)]
    #[case("low", Priority::Low)]
    #[case("HIGH", Priority::High)]
    #[case(" Medium ", Priority::Medium)]
    fn priorities(#[case] raw: &str, #[case] expected: Priority) {
        assert_eq!(parse_priority(raw), Ok(expected));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert_eq!(
            parse_priority("urgent"),
            Err(InputError::InvalidPriority("urgent".to_string()))
        );
    }

    #[test]
    fn description_is_trimmed_and_required() {
        assert_eq!(parse_description("  Buy milk "), Ok("Buy milk".to_string()));
        assert_eq!(parse_description(" \t"), Err(InputError::EmptyDescription));
    }

    #[rstest]
    #[case("1", Ok(1))]
    #[case(" 12\n", Ok(12))]
    #[case("one", Err(InputError::NotANumber("one".to_string())))]
    #[case("-1", Err(InputError::NotANumber("-1".to_string())))]
    fn selections(#[case] raw: &str, #[case] expected: Result<usize, InputError>) {
        assert_eq!(parse_selection(raw), expected);
    }
}
