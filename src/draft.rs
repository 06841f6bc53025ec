//! UBJSON draft selection.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A revision of the UBJSON specification.
///
/// The two supported drafts share their architecture but disagree on
/// marker byte identities and container framing, so every codec entry
/// point takes a `Draft` and dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Draft {
    /// Draft-8: `s`/`S` strings, `h`/`H` huge numbers, sized `a`/`A`
    /// arrays and `o`/`O` objects, streamed containers closed by `E`.
    Draft8,
    /// Draft-9: JSON-like `[` `]` `{` `}` containers, `S` strings with
    /// integer-marker lengths, `U` uint8 and `C` char markers.
    Draft9,
}

impl Draft {
    /// Canonical name, as accepted by [`Draft::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Draft8 => "draft-8",
            Self::Draft9 => "draft-9",
        }
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Draft {
    type Err = Error;

    /// Parses a draft name; `"draft-8"` and `"draft8"` (any case) select
    /// Draft-8, likewise for Draft-9.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "draft-8" | "draft8" => Ok(Self::Draft8),
            "draft-9" | "draft9" => Ok(Self::Draft9),
            _ => Err(Error::Draft(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_drafts() {
        assert_eq!("draft-8".parse::<Draft>().unwrap(), Draft::Draft8);
        assert_eq!("draft8".parse::<Draft>().unwrap(), Draft::Draft8);
        assert_eq!("Draft-9".parse::<Draft>().unwrap(), Draft::Draft9);
        assert_eq!("DRAFT9".parse::<Draft>().unwrap(), Draft::Draft9);
    }

    #[test]
    fn parse_unknown_draft() {
        let err = "draft-12".parse::<Draft>().unwrap_err();
        assert!(matches!(err, Error::Draft(name) if name == "draft-12"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for draft in [Draft::Draft8, Draft::Draft9] {
            assert_eq!(draft.to_string().parse::<Draft>().unwrap(), draft);
        }
    }
}
