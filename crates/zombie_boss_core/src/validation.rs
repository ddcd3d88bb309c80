//! Input checks applied before any store call.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Accepts `local@domain.tld`: one `@`, no ASCII whitespace, and a dot inside
/// the domain with at least one character on each side. Only tab, newline,
/// form feed, carriage return and space count as whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new(format!("'{email}' is not a valid email address"));

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if email.chars().any(is_separator) {
        return Err(invalid());
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len());
    if !has_inner_dot {
        return Err(invalid());
    }

    Ok(())
}

fn is_separator(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0c' | '\r' | ' ')
}

pub fn validate_game_id(game_id: &str) -> Result<(), ValidationError> {
    if game_id.is_empty() {
        return Err(ValidationError::new("game id cannot be empty"));
    }
    if !game_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::new(format!(
            "game id '{game_id}' must contain digits only"
        )));
    }
    Ok(())
}

pub fn parse_count(raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>()
        .map_err(|error| ValidationError::new(format!("count '{raw}' is not an integer: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        for email in ["a@b.com", "player.one@mail.example.org", "x+y@a.b"] {
            assert!(validate_email(email).is_ok(), "{email} should be accepted");
        }
    }

    #[test]
    fn rejects_addresses_without_domain_dot_or_local_part() {
        for email in [
            "not-an-email",
            "@b.com",
            "a@.com",
            "a@com.",
            "a@com",
            "a@@b.com",
            "a@b@c.com",
            "a b@c.com",
            "",
        ] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn only_ascii_whitespace_breaks_an_address() {
        for email in ["a\u{a0}b@c.com", "a\u{b}b@c.com", "a@b.c\u{2003}d"] {
            assert!(validate_email(email).is_ok(), "{email:?} should be accepted");
        }
        for email in ["a\tb@c.com", "a@b\n.com", "a@b.c\rd", "a\x0cb@c.com"] {
            assert!(validate_email(email).is_err(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn game_id_must_be_non_empty_digits() {
        assert!(validate_game_id("123").is_ok());
        assert!(validate_game_id("007").is_ok());

        let error = validate_game_id("abc").expect_err("letters should fail");
        assert_eq!(error.message(), "game id 'abc' must contain digits only");
        assert!(validate_game_id("").is_err());
        assert!(validate_game_id("12a").is_err());
        assert!(validate_game_id("-1").is_err());
    }

    #[test]
    fn parse_count_accepts_signed_integers_only() {
        assert_eq!(parse_count("15"), Ok(15));
        assert_eq!(parse_count("-3"), Ok(-3));
        assert!(parse_count("1.5").is_err());
        assert!(parse_count("ten").is_err());
    }
}
