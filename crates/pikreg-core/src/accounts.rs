//! Account batch input.

use crate::error::{CoreError, CoreResult};

const SEPARATOR: &str = "----";

/// One account to register, as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLine {
    /// Mailbox address, also the provider login.
    pub email: String,
    /// Mailbox password.
    pub password: String,
    /// Mailbox OAuth client id.
    pub client_id: String,
    /// Mailbox OAuth refresh token.
    pub token: String,
}

/// Parse `email----password----clientId----token` lines.
///
/// Blank lines are skipped and fields beyond the fourth are ignored. Parsing
/// stops at the first malformed line.
///
/// # Errors
///
/// Returns [`CoreError::MalformedAccountLine`] with the 1-based line number of
/// the first bad line, or [`CoreError::EmptyBatch`] when no line holds an
/// account.
pub fn parse_account_lines(input: &str) -> CoreResult<Vec<AccountLine>> {
    let mut accounts = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = index + 1;
        let parts: Vec<&str> = raw.split(SEPARATOR).map(str::trim).collect();
        if parts.len() < 4 {
            return Err(CoreError::MalformedAccountLine {
                line,
                reason: "fewer than four fields",
            });
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(CoreError::MalformedAccountLine {
                line,
                reason: "empty field",
            });
        }
        accounts.push(AccountLine {
            email: parts[0].to_string(),
            password: parts[1].to_string(),
            client_id: parts[2].to_string(),
            token: parts[3].to_string(),
        });
    }
    if accounts.is_empty() {
        return Err(CoreError::EmptyBatch);
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_skips_blanks() {
        let input = "a@x.io----pw----cid----tok\n\n  b@x.io ---- pw2 ----cid2----tok2  \n";
        let accounts = parse_account_lines(input).expect("parse");
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].email, "b@x.io");
        assert_eq!(accounts[1].password, "pw2");
        assert_eq!(accounts[1].token, "tok2");
    }

    #[test]
    fn reports_physical_line_of_first_error() {
        let input = "a@x.io----pw----cid----tok\n\nb@x.io----pw----cid\n";
        assert_eq!(
            parse_account_lines(input),
            Err(CoreError::MalformedAccountLine {
                line: 3,
                reason: "fewer than four fields"
            })
        );
    }

    #[test]
    fn rejects_empty_fields_and_empty_batches() {
        assert!(matches!(
            parse_account_lines("a@x.io--------cid----tok"),
            Err(CoreError::MalformedAccountLine { line: 1, .. })
        ));
        assert_eq!(parse_account_lines(" \n\n"), Err(CoreError::EmptyBatch));
    }
}
