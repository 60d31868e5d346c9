//! Token model - the atomic chip embedded in a formula
//!
//! A [`Token`] is a resolved reference to an external entity (a position or
//! an impact profile). Once inserted it is immutable: the label is a snapshot
//! taken at insertion time and is never re-bound to the upstream entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which family of external entity a token refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Position,
    Impact,
}

impl TokenKind {
    /// All kinds, in trigger priority order
    pub const ALL: [TokenKind; 2] = [TokenKind::Position, TokenKind::Impact];

    /// Wire name used in the serialized `kind` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Position => "position",
            TokenKind::Impact => "impact",
        }
    }

    /// Character that opens a query span for this kind unless remapped
    pub fn default_trigger(self) -> char {
        match self {
            TokenKind::Position => '$',
            TokenKind::Impact => '#',
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(TokenKind::Position),
            "impact" => Ok(TokenKind::Impact),
            _ => Err(()),
        }
    }
}

/// An unresolved search result offered in the suggestion popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub label: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// An atomic inline chip: `{id, kind, label}`
///
/// Equality is structural over all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub kind: TokenKind,
    pub label: String,
}

impl Token {
    pub fn new(id: impl Into<String>, kind: TokenKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
        }
    }

    /// Build the token a committed candidate turns into
    pub fn from_candidate(kind: TokenKind, candidate: &Candidate) -> Self {
        Self::new(candidate.id.clone(), kind, candidate.label.clone())
    }

    /// Data a chip widget needs to draw itself
    pub fn chip(&self) -> ChipView<'_> {
        ChipView {
            label: &self.label,
            badge: format!("{}{}", self.kind.default_trigger(), self.id),
            remove_hint: format!("Remove {}", self.label),
        }
    }
}

/// Rendering data extracted from a token (label, `$P_0001`-style badge,
/// accessible name of the remove button)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipView<'a> {
    pub label: &'a str,
    pub badge: String,
    pub remove_hint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_round_trip() {
        for kind in TokenKind::ALL {
            assert_eq!(kind.as_str().parse::<TokenKind>(), Ok(kind));
        }
        assert!("formula".parse::<TokenKind>().is_err());
        assert!("Position".parse::<TokenKind>().is_err());
    }

    #[test]
    fn test_default_triggers() {
        assert_eq!(TokenKind::Position.default_trigger(), '$');
        assert_eq!(TokenKind::Impact.default_trigger(), '#');
    }

    #[test]
    fn test_token_from_candidate_snapshots_label() {
        let mut candidate = Candidate::new("P_0001", "Energy consumption");
        let token = Token::from_candidate(TokenKind::Position, &candidate);
        candidate.label = "Renamed upstream".to_string();

        assert_eq!(token.label, "Energy consumption");
        assert_eq!(token.id, "P_0001");
        assert_eq!(token.kind, TokenKind::Position);
    }

    #[test]
    fn test_chip_view() {
        let token = Token::new("I_0002", TokenKind::Impact, "GHG Scope 2");
        let chip = token.chip();
        assert_eq!(chip.label, "GHG Scope 2");
        assert_eq!(chip.badge, "#I_0002");
        assert_eq!(chip.remove_hint, "Remove GHG Scope 2");
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&TokenKind::Impact).unwrap();
        assert_eq!(json, "\"impact\"");
    }
}
