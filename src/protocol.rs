//! Line-oriented control protocol.
//!
//! Each input line is either a control word or a condition event of the
//! form `<channel> <index> <value>`. Event indices are one-based on the
//! wire and zero-based everywhere else.

use thiserror::Error;

/// One parsed input line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Init,
    Reset,
    Ping,
    /// Print the condition map
    Conditions,
    /// Print the state names
    States,
    Event {
        channel: String,
        /// Zero-based slot index
        index: usize,
        value: f64,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Empty command")]
    Empty,

    #[error("Usage: {channel} [index] [value]")]
    MissingArguments { channel: String },

    #[error("Unexpected trailing input after '{channel}' event: '{rest}'")]
    TrailingInput { channel: String, rest: String },

    #[error("Invalid index '{raw}' for channel '{channel}'. Indices start at 1")]
    InvalidIndex { channel: String, raw: String },

    #[error("Invalid value '{raw}' for channel '{channel}'")]
    InvalidValue { channel: String, raw: String },
}

impl Command {
    /// Parse one input line.
    ///
    /// ```rust
    /// use showstate::protocol::Command;
    ///
    /// let command = Command::parse("/retrieval 1 1").unwrap();
    /// assert_eq!(
    ///     command,
    ///     Command::Event { channel: "/retrieval".to_string(), index: 0, value: 1.0 }
    /// );
    /// assert_eq!(Command::parse("init").unwrap(), Command::Init);
    /// ```
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ProtocolError::Empty)?;

        let args: Vec<&str> = words.collect();
        if args.is_empty() {
            match head {
                "init" => return Ok(Command::Init),
                "reset" => return Ok(Command::Reset),
                "ping" => return Ok(Command::Ping),
                "conditions" => return Ok(Command::Conditions),
                "states" => return Ok(Command::States),
                _ => {}
            }
        }

        let channel = head.to_string();
        let (raw_index, raw_value, rest) = match args.as_slice() {
            [index, value, rest @ ..] => (*index, *value, rest),
            _ => return Err(ProtocolError::MissingArguments { channel }),
        };
        if !rest.is_empty() {
            return Err(ProtocolError::TrailingInput {
                channel,
                rest: rest.join(" "),
            });
        }

        let index = match raw_index.parse::<usize>() {
            Ok(index) if index >= 1 => index - 1,
            _ => {
                return Err(ProtocolError::InvalidIndex {
                    channel,
                    raw: raw_index.to_string(),
                })
            }
        };
        let value = match raw_value.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                return Err(ProtocolError::InvalidValue {
                    channel,
                    raw: raw_value.to_string(),
                })
            }
        };

        Ok(Command::Event {
            channel,
            index,
            value,
        })
    }
}
