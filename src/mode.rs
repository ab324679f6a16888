//! Cabinet protocol profile.

use std::fmt;
use std::str::FromStr;

/// "Project DIVA Arcade Future Tone" or "CHUNITHM" protocol profile.
///
/// The two profiles share framing and most commands but differ in the
/// hardware-info payload and a small set of command table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Diva,
    Chu,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Diva => "diva",
            Mode::Chu => "chu",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized mode {0:?}, expected \"diva\" or \"chu\"")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diva" => Ok(Mode::Diva),
            "chu" => Ok(Mode::Chu),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("DIVA".parse::<Mode>().unwrap(), Mode::Diva);
        assert_eq!("Chu".parse::<Mode>().unwrap(), Mode::Chu);
    }

    #[test]
    fn rejects_unknown() {
        assert!("segaclub".parse::<Mode>().is_err());
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(Mode::Diva.to_string(), "diva");
        assert_eq!(Mode::Chu.to_string(), "chu");
    }
}
