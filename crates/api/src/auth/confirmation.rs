//! Issuing and checking signup confirmation codes for stored users.

use chrono::Utc;
use critica_core::confirmation::{check_code, make_code};
use critica_db::models::user::User;

use crate::config::ConfirmationConfig;

/// Issue a code bound to the user's current state.
pub fn issue_code(config: &ConfirmationConfig, user: &User) -> String {
    make_code(
        config.secret.as_bytes(),
        &user.code_subject(),
        Utc::now().timestamp(),
    )
}

/// Whether `code` is valid for the user right now.
pub fn verify_code(config: &ConfirmationConfig, user: &User, code: &str) -> bool {
    check_code(
        config.secret.as_bytes(),
        &user.code_subject(),
        code,
        Utc::now().timestamp(),
        config.max_age_secs,
    )
}
