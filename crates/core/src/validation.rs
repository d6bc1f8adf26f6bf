//! Field-level and cross-field validation predicates.
//!
//! The single-field predicates return [`ValidationError`] so they can be
//! plugged into `#[validate(custom(function = "..."))]` on request DTOs.
//! Checks that need context the DTO does not have (the clock, the store)
//! are merged in afterwards with [`merge_field_error`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;

/// Username reserved for the `/users/me` route.
pub const RESERVED_USERNAME: &str = "me";

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: u64 = 150;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: u64 = 254;

/// Maximum length of a category or genre slug.
pub const MAX_SLUG_LENGTH: u64 = 50;

/// Lowest and highest accepted review score.
pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

/// Key used for errors that are not tied to one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid")
});

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Reject the reserved `me` username and characters outside `[\w.@+-]`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username == RESERVED_USERNAME {
        return Err(invalid(
            "reserved_username",
            "Username \"me\" is reserved and cannot be used",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(invalid(
            "invalid_username",
            "Username may contain only letters, digits and @/./+/-/_ characters",
        ));
    }
    Ok(())
}

/// Slugs are restricted to `[-a-zA-Z0-9_]+`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_slug",
            "Slug may contain only latin letters, digits, hyphens and underscores",
        ))
    }
}

/// The current calendar year in UTC.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// A release year may not lie after `current_year`. The current year itself is fine.
pub fn validate_release_year(year: i32, current_year: i32) -> Result<(), ValidationError> {
    if year > current_year {
        Err(invalid("year_in_future", "Release year cannot be in the future"))
    } else {
        Ok(())
    }
}

/// How a review is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewWrite {
    /// POST: a new review.
    Create,
    /// PUT: full replacement of an existing review.
    Replace,
    /// PATCH: partial update of an existing review.
    Patch,
}

/// One review per author per title.
///
/// Only creation is checked; replacing or patching targets the author's
/// existing review and so can never produce a second one.
pub fn check_duplicate_review(already_reviewed: bool, mode: ReviewWrite) -> Result<(), CoreError> {
    if mode == ReviewWrite::Create && already_reviewed {
        return Err(CoreError::Validation(
            "You have already reviewed this title".to_string(),
        ));
    }
    Ok(())
}

/// Fold one extra field check into the result of a `Validate::validate` call.
pub fn merge_field_error(
    result: Result<(), ValidationErrors>,
    field: &'static str,
    check: Result<(), ValidationError>,
) -> Result<(), ValidationErrors> {
    let Err(err) = check else {
        return result;
    };
    let mut errors = result.err().unwrap_or_else(ValidationErrors::new);
    errors.add(field, err);
    Err(errors)
}

/// Build a [`ValidationErrors`] holding a single message for `field`.
pub fn single_field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

/// Flatten validation errors to `{field: [message, ...]}` for responses.
///
/// Errors without a message fall back to their code.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- username ------------------------------------------------------------

    #[test]
    fn username_me_is_reserved() {
        let err = validate_username("me").unwrap_err();
        assert_eq!(err.code, "reserved_username");
    }

    #[test]
    fn usernames_containing_me_are_fine() {
        assert!(validate_username("meg").is_ok());
        assert!(validate_username("me.too").is_ok());
        assert!(validate_username("ME").is_ok());
    }

    #[test]
    fn username_rejects_spaces_and_symbols() {
        assert!(validate_username("bob smith").is_err());
        assert!(validate_username("bob!").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn username_accepts_allowed_punctuation() {
        assert!(validate_username("bob.smith+reviews@home-1_a").is_ok());
    }

    // -- slug ----------------------------------------------------------------

    #[test]
    fn slug_accepts_letters_digits_dash_underscore() {
        assert!(validate_slug("sci-fi_2024").is_ok());
    }

    #[test]
    fn slug_rejects_other_characters() {
        assert!(validate_slug("sci fi").is_err());
        assert!(validate_slug("фантастика").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("").is_err());
    }

    // -- year ----------------------------------------------------------------

    #[test]
    fn current_year_is_accepted() {
        assert!(validate_release_year(2026, 2026).is_ok());
        assert!(validate_release_year(current_year(), current_year()).is_ok());
    }

    #[test]
    fn next_year_is_rejected() {
        let err = validate_release_year(2027, 2026).unwrap_err();
        assert_eq!(err.code, "year_in_future");
        assert!(validate_release_year(current_year() + 1, current_year()).is_err());
    }

    #[test]
    fn past_years_are_accepted() {
        assert!(validate_release_year(1895, 2026).is_ok());
    }

    // -- duplicate review ----------------------------------------------------

    #[test]
    fn second_review_on_create_is_rejected() {
        assert_matches!(
            check_duplicate_review(true, ReviewWrite::Create),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn first_review_on_create_is_accepted() {
        assert!(check_duplicate_review(false, ReviewWrite::Create).is_ok());
    }

    #[test]
    fn updates_skip_the_duplicate_check() {
        assert!(check_duplicate_review(true, ReviewWrite::Patch).is_ok());
        assert!(check_duplicate_review(true, ReviewWrite::Replace).is_ok());
    }

    // -- error plumbing ------------------------------------------------------

    #[test]
    fn merge_adds_failed_check_to_ok_result() {
        let merged = merge_field_error(Ok(()), "year", validate_release_year(3000, 2026));
        let errors = merged.unwrap_err();
        let messages = field_messages(&errors);
        assert_eq!(
            messages.get("year").map(Vec::len),
            Some(1),
            "year should carry exactly one message"
        );
    }

    #[test]
    fn merge_keeps_existing_errors() {
        let existing = Err(single_field_error("name", "length", "too long"));
        let merged = merge_field_error(existing, "year", validate_release_year(3000, 2026));
        let messages = field_messages(&merged.unwrap_err());
        assert!(messages.contains_key("name"));
        assert!(messages.contains_key("year"));
    }

    #[test]
    fn merge_passes_through_when_check_succeeds() {
        assert!(merge_field_error(Ok(()), "year", Ok(())).is_ok());
    }

    #[test]
    fn field_messages_fall_back_to_code() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));
        let messages = field_messages(&errors);
        assert_eq!(messages["email"], vec!["email".to_string()]);
    }
}
