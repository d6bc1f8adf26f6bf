//! Email confirmation codes.
//!
//! A code is `<issued_at hex>-<HMAC-SHA256 hex>` where the MAC covers the
//! user's id, email and `last_login_at` plus the issue time. Exchanging a
//! code for a token stamps `last_login_at`, which changes the MAC input and
//! so invalidates every code issued before it. Codes also expire after a
//! configurable age.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of a confirmation code: three days.
pub const DEFAULT_MAX_AGE_SECS: i64 = 3 * 24 * 60 * 60;

/// The slice of user state a code is bound to.
#[derive(Debug, Clone, Copy)]
pub struct CodeSubject<'a> {
    pub user_id: DbId,
    pub email: &'a str,
    pub last_login_at: Option<Timestamp>,
}

fn mac_for(secret: &[u8], subject: &CodeSubject<'_>, issued_at: i64) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
    let last_login = subject
        .last_login_at
        .map(|t| t.timestamp_micros())
        .unwrap_or(0);
    mac.update(
        format!(
            "{}:{}:{}:{}",
            subject.user_id, subject.email, last_login, issued_at
        )
        .as_bytes(),
    );
    mac
}

/// Issue a code for `subject` at unix time `issued_at`.
pub fn make_code(secret: &[u8], subject: &CodeSubject<'_>, issued_at: i64) -> String {
    let tag = mac_for(secret, subject, issued_at).finalize().into_bytes();
    format!("{issued_at:x}-{tag:x}")
}

/// Check `code` against the subject's current state.
///
/// Fails for malformed codes, codes issued in the future, codes older than
/// `max_age_secs` and codes whose MAC does not match.
pub fn check_code(
    secret: &[u8],
    subject: &CodeSubject<'_>,
    code: &str,
    now: i64,
    max_age_secs: i64,
) -> bool {
    let Some((ts_part, tag_part)) = code.trim().split_once('-') else {
        return false;
    };
    let Ok(issued_at) = i64::from_str_radix(ts_part, 16) else {
        return false;
    };
    if issued_at > now || now - issued_at > max_age_secs {
        return false;
    }
    let Some(tag) = decode_hex(tag_part) else {
        return false;
    };
    mac_for(secret, subject, issued_at).verify_slice(&tag).is_ok()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SECRET: &[u8] = b"confirmation-test-secret";
    const NOW: i64 = 1_790_000_000;

    fn subject(last_login_at: Option<Timestamp>) -> CodeSubject<'static> {
        CodeSubject {
            user_id: 7,
            email: "bob@example.com",
            last_login_at,
        }
    }

    #[test]
    fn fresh_code_verifies() {
        let s = subject(None);
        let code = make_code(SECRET, &s, NOW);
        assert!(check_code(SECRET, &s, &code, NOW + 60, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn wrong_code_fails() {
        let s = subject(None);
        assert!(!check_code(SECRET, &s, "wrong", NOW, DEFAULT_MAX_AGE_SECS));
        assert!(!check_code(SECRET, &s, "", NOW, DEFAULT_MAX_AGE_SECS));

        let code = make_code(SECRET, &s, NOW);
        let mut tampered = code.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        assert!(!check_code(SECRET, &s, &tampered, NOW, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn code_is_single_use_once_last_login_changes() {
        let before = subject(None);
        let code = make_code(SECRET, &before, NOW);

        let after = subject(Some(Utc.timestamp_opt(NOW + 5, 0).unwrap()));
        assert!(!check_code(SECRET, &after, &code, NOW + 10, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn code_is_bound_to_email_and_user() {
        let s = subject(None);
        let code = make_code(SECRET, &s, NOW);

        let other_email = CodeSubject {
            email: "mallory@example.com",
            ..s
        };
        assert!(!check_code(SECRET, &other_email, &code, NOW, DEFAULT_MAX_AGE_SECS));

        let other_user = CodeSubject { user_id: 8, ..s };
        assert!(!check_code(SECRET, &other_user, &code, NOW, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn different_secret_fails() {
        let s = subject(None);
        let code = make_code(SECRET, &s, NOW);
        assert!(!check_code(b"another-secret", &s, &code, NOW, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn expired_code_fails() {
        let s = subject(None);
        let code = make_code(SECRET, &s, NOW);
        assert!(check_code(SECRET, &s, &code, NOW + 100, 100));
        assert!(!check_code(SECRET, &s, &code, NOW + 101, 100));
    }

    #[test]
    fn code_from_the_future_fails() {
        let s = subject(None);
        let code = make_code(SECRET, &s, NOW + 1_000);
        assert!(!check_code(SECRET, &s, &code, NOW, DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn decode_hex_rejects_odd_and_non_hex() {
        assert_eq!(decode_hex("0aff"), Some(vec![0x0a, 0xff]));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex("zz"), None);
    }
}
