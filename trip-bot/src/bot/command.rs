//! Compact selection tokens.
//!
//! Buttons carry short `action[:param]` tokens because chat platforms cap
//! callback payloads at a few dozen bytes. Tokens are decoded once, at the
//! transport boundary, into a `Command`.

use std::fmt;
use std::str::FromStr;

/// A station button: an index into the user's recent list or into the
/// popular stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRef {
    Recent(usize),
    Popular(usize),
}

/// A user action on the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Back,
    Cancel,
    SelectStation(StationRef),
    /// Index into the full result list, not the page.
    SelectTrain(usize),
    SchedulePage(usize),
    EditFrom,
    EditTo,
    /// Switch from buttons to typing the station name.
    ManualEntry,
    /// Repeat the last schedule search.
    Retry,
    /// Inert button (the page indicator).
    Noop,
}

/// Error returned for a token that is not a known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("bad parameter for {action}: {param:?}")]
    BadParam { action: &'static str, param: String },
}

impl Command {
    /// Encode into a button token.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a button token.
    pub fn decode(token: &str) -> Result<Self, CommandError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CommandError::Empty);
        }

        let (action, param) = match token.split_once(':') {
            Some((action, param)) => (action, Some(param)),
            None => (token, None),
        };

        match (action, param) {
            ("b", None) => Ok(Command::Back),
            ("x", None) | ("cancel", None) => Ok(Command::Cancel),
            ("ef", None) => Ok(Command::EditFrom),
            ("et", None) => Ok(Command::EditTo),
            ("text_input", None) => Ok(Command::ManualEntry),
            ("rt", None) => Ok(Command::Retry),
            ("noop", None) => Ok(Command::Noop),
            ("ss", Some(p)) => parse_station_ref(p).map(Command::SelectStation),
            ("tr", Some(p)) => parse_index("tr", p).map(Command::SelectTrain),
            // Buttons sent by older versions of the bot
            ("train", Some(p)) => parse_index("train", p).map(Command::SelectTrain),
            ("sp", Some(p)) => parse_index("sp", p).map(Command::SchedulePage),
            _ => Err(CommandError::Unknown(token.to_string())),
        }
    }
}

fn parse_index(action: &'static str, param: &str) -> Result<usize, CommandError> {
    param.parse().map_err(|_| CommandError::BadParam {
        action,
        param: param.to_string(),
    })
}

fn parse_station_ref(param: &str) -> Result<StationRef, CommandError> {
    let bad = || CommandError::BadParam {
        action: "ss",
        param: param.to_string(),
    };

    if let Some(i) = param.strip_prefix('r') {
        return i.parse().map(StationRef::Recent).map_err(|_| bad());
    }
    if let Some(i) = param.strip_prefix('p') {
        return i.parse().map(StationRef::Popular).map_err(|_| bad());
    }
    Err(bad())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Back => f.write_str("b"),
            Command::Cancel => f.write_str("x"),
            Command::SelectStation(StationRef::Recent(i)) => write!(f, "ss:r{i}"),
            Command::SelectStation(StationRef::Popular(i)) => write!(f, "ss:p{i}"),
            Command::SelectTrain(i) => write!(f, "tr:{i}"),
            Command::SchedulePage(p) => write!(f, "sp:{p}"),
            Command::EditFrom => f.write_str("ef"),
            Command::EditTo => f.write_str("et"),
            Command::ManualEntry => f.write_str("text_input"),
            Command::Retry => f.write_str("rt"),
            Command::Noop => f.write_str("noop"),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple_tokens() {
        assert_eq!(Command::decode("b"), Ok(Command::Back));
        assert_eq!(Command::decode("x"), Ok(Command::Cancel));
        assert_eq!(Command::decode("ef"), Ok(Command::EditFrom));
        assert_eq!(Command::decode("et"), Ok(Command::EditTo));
        assert_eq!(Command::decode("text_input"), Ok(Command::ManualEntry));
        assert_eq!(Command::decode("rt"), Ok(Command::Retry));
        assert_eq!(Command::decode("noop"), Ok(Command::Noop));
    }

    #[test]
    fn decode_parameterised_tokens() {
        assert_eq!(
            Command::decode("ss:r2"),
            Ok(Command::SelectStation(StationRef::Recent(2)))
        );
        assert_eq!(
            Command::decode("ss:p6"),
            Ok(Command::SelectStation(StationRef::Popular(6)))
        );
        assert_eq!(Command::decode("tr:11"), Ok(Command::SelectTrain(11)));
        assert_eq!(Command::decode("sp:0"), Ok(Command::SchedulePage(0)));
    }

    #[test]
    fn decode_legacy_tokens() {
        assert_eq!(Command::decode("train:3"), Ok(Command::SelectTrain(3)));
        assert_eq!(Command::decode("cancel"), Ok(Command::Cancel));
    }

    #[test]
    fn reject_garbage() {
        assert_eq!(Command::decode(""), Err(CommandError::Empty));
        assert!(matches!(
            Command::decode("zz"),
            Err(CommandError::Unknown(_))
        ));
        assert!(matches!(
            Command::decode("tr:-1"),
            Err(CommandError::BadParam { action: "tr", .. })
        ));
        assert!(Command::decode("ss:q1").is_err());
        assert!(Command::decode("ss:r").is_err());
        assert!(Command::decode("b:1").is_err());
        assert!(Command::decode("tr").is_err());
    }

    #[test]
    fn tokens_fit_callback_limit() {
        let longest = Command::SelectTrain(usize::MAX).encode();
        assert!(longest.len() <= 64);
    }

    #[test]
    fn encode_matches_decode() {
        let all = [
            Command::Back,
            Command::Cancel,
            Command::SelectStation(StationRef::Recent(0)),
            Command::SelectStation(StationRef::Popular(4)),
            Command::SelectTrain(7),
            Command::SchedulePage(2),
            Command::EditFrom,
            Command::EditTo,
            Command::ManualEntry,
            Command::Retry,
            Command::Noop,
        ];
        for cmd in all {
            assert_eq!(cmd.encode().parse::<Command>(), Ok(cmd));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary input is rejected, never a panic
        #[test]
        fn decode_is_total(token in ".{0,40}") {
            let _ = Command::decode(&token);
        }

        /// Indices survive the token format unchanged
        #[test]
        fn train_index_preserved(i in 0usize..100_000) {
            prop_assert_eq!(
                Command::decode(&Command::SelectTrain(i).encode()),
                Ok(Command::SelectTrain(i))
            );
        }
    }
}
