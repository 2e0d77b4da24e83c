//! Parse diagnostics.

use std::fmt;

use crate::token::Token;

/// A recorded, non-fatal parse anomaly anchored to the offending token.
///
/// Diagnostics are collected in source order while the tree is built; they
/// never abort the parse. Mapping the token span to a line and column is the
/// caller's concern (an editor keeps a line index, this crate does not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub token: Token,
}

impl Diagnostic {
    pub(crate) fn new(message: impl Into<String>, token: Token) -> Self {
        Self { message: message.into(), token }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}..{}: {}", self.token.start, self.token.end(), self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn display_carries_the_span() {
        let diag = Diagnostic::new("unexpected Assign in start tag", Token::new(TokenKind::Assign, 3, 1));
        assert_eq!(diag.to_string(), "syntax error at 3..4: unexpected Assign in start tag");
    }
}
