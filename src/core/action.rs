//! Entry and exit action messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One whitespace-delimited token of an action message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Number(f64),
    Text(String),
}

impl Token {
    /// Coerce a raw token: finite numbers become [`Token::Number`], anything
    /// else stays text.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Token::Number(number),
            _ => Token::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(number) => Some(*number),
            Token::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Number(_) => None,
            Token::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(number) => write!(f, "{number}"),
            Token::Text(text) => f.write_str(text),
        }
    }
}

/// An output message emitted when a state is entered or left.
///
/// The message keeps the cell text it was parsed from alongside the
/// coerced tokens.
///
/// # Example
///
/// ```rust
/// use showstate::core::{ActionMessage, Token};
///
/// let action = ActionMessage::parse("/video 2 1");
/// assert_eq!(action.address(), Some("/video"));
/// assert_eq!(
///     action.tokens(),
///     &[
///         Token::Text("/video".to_string()),
///         Token::Number(2.0),
///         Token::Number(1.0),
///     ]
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionMessage {
    source: String,
    tokens: Vec<Token>,
}

impl ActionMessage {
    pub fn parse(raw: &str) -> Self {
        let source = raw.trim().to_string();
        let tokens = source.split_whitespace().map(Token::parse).collect();
        Self { source, tokens }
    }

    /// Text of the configuration cell this message came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Leading text token, typically an OSC-style path.
    pub fn address(&self) -> Option<&str> {
        self.tokens.first().and_then(Token::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for ActionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tokens_are_coerced() {
        assert_eq!(Token::parse("5"), Token::Number(5.0));
        assert_eq!(Token::parse("-20"), Token::Number(-20.0));
        assert_eq!(Token::parse("0.25"), Token::Number(0.25));
    }

    #[test]
    fn non_numeric_tokens_stay_text() {
        assert_eq!(Token::parse("/out/1"), Token::Text("/out/1".to_string()));
        assert_eq!(Token::parse("stop"), Token::Text("stop".to_string()));
        assert_eq!(Token::parse("NaN"), Token::Text("NaN".to_string()));
        assert_eq!(Token::parse("inf"), Token::Text("inf".to_string()));
    }

    #[test]
    fn parse_preserves_token_order() {
        let action = ActionMessage::parse("/audio gain -20");
        assert_eq!(
            action.tokens(),
            &[
                Token::Text("/audio".to_string()),
                Token::Text("gain".to_string()),
                Token::Number(-20.0),
            ]
        );
    }

    #[test]
    fn repeated_whitespace_yields_no_empty_tokens() {
        let action = ActionMessage::parse("  /video   3 ");
        assert_eq!(action.tokens().len(), 2);
        assert_eq!(action.source(), "/video   3");
    }

    #[test]
    fn display_joins_tokens() {
        let action = ActionMessage::parse("/out/1 5 0.5 loop");
        assert_eq!(action.to_string(), "/out/1 5 0.5 loop");
    }

    #[test]
    fn address_requires_leading_text() {
        assert_eq!(ActionMessage::parse("3 /video").address(), None);
        assert!(ActionMessage::parse("").is_empty());
    }

    #[test]
    fn tokens_serialize_untagged() {
        let action = ActionMessage::parse("/video 2");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["tokens"], serde_json::json!(["/video", 2.0]));
    }
}
