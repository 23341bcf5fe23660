//! Finding and describing resolvable card combinations.
//!
//! A hand can be resolved as a *Triple Threat* (three cards of one rank) or a
//! *Matched Edge* (two cards of one rank). Jokers are wild. Any joker in the
//! combination opens all four elements to the player.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Element};

/// The two kinds of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Three matching cards.
    TripleThreat,
    /// Two matching cards.
    MatchedEdge,
}

impl ResolutionKind {
    /// Number of cards the resolution consumes.
    #[must_use]
    pub fn card_count(self) -> usize {
        match self {
            Self::TripleThreat => 3,
            Self::MatchedEdge => 2,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::TripleThreat => "Triple Threat",
            Self::MatchedEdge => "Matched Edge",
        }
    }
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TripleThreat => write!(f, "triple_threat"),
            Self::MatchedEdge => write!(f, "matched_edge"),
        }
    }
}

impl std::str::FromStr for ResolutionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "triple_threat" => Ok(Self::TripleThreat),
            "matched_edge" => Ok(Self::MatchedEdge),
            other => Err(format!("unknown resolution kind: {other}")),
        }
    }
}

/// A combination of hand cards that can be resolved into an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Triple Threat or Matched Edge.
    pub kind: ResolutionKind,
    /// Shared rank of the cards.
    pub value: u8,
    /// Elements the player may pick from.
    pub elements: Vec<Element>,
    /// 0-based hand positions, ascending.
    pub positions: Vec<usize>,
}

impl Resolution {
    /// Rules text for the effect of this resolution.
    #[must_use]
    pub fn effect_description(&self) -> String {
        let elements = self.element_symbols();
        match self.kind {
            ResolutionKind::TripleThreat => format!(
                "Choose three targets present on the scene. For each target you may choose to:\n\
                 • Have them recover from status effects (dazed/shaken/slow/weak) and heal {} Hit Points\n\
                 • Have them suffer status effects (dazed/shaken/slow/weak) and take {} damage\n\
                 Available elements: {}",
                u32::from(self.value) + 15,
                u32::from(self.value) + 5,
                elements
            ),
            ResolutionKind::MatchedEdge => format!(
                "Perform a free attack with an equipped weapon. If this attack deals damage:\n\
                 • Choose one element from {}\n\
                 • All damage becomes that element type\n\
                 • Deal {} additional damage",
                elements, self.value
            ),
        }
    }

    fn element_symbols(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.symbol())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards = self
            .positions
            .iter()
            .map(|&i| format!("[{}]", i + 1))
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "{}: {} - Elements: {}",
            self.kind.title(),
            cards,
            self.element_symbols()
        )
    }
}

/// Enumerate every resolution available in `hand`.
///
/// Triples come first, then pairs, each in lexicographic position order.
/// `joker_value` is the value of a combination made only of jokers.
#[must_use]
pub fn find_resolutions(hand: &[Card], joker_value: u8) -> Vec<Resolution> {
    let n = hand.len();
    let mut found = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if let Some(r) = check(hand, &[i, j, k], joker_value) {
                    found.push(r);
                }
            }
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(r) = check(hand, &[i, j], joker_value) {
                found.push(r);
            }
        }
    }

    found
}

fn check(hand: &[Card], positions: &[usize], joker_value: u8) -> Option<Resolution> {
    let kind = match positions.len() {
        3 => ResolutionKind::TripleThreat,
        2 => ResolutionKind::MatchedEdge,
        _ => return None,
    };

    let mut value = None;
    let mut has_joker = false;
    let mut elements = Vec::with_capacity(positions.len());

    for &p in positions {
        let card = &hand[p];
        match card.rank {
            Some(rank) => {
                if value.is_some_and(|v| v != rank) {
                    return None;
                }
                value = Some(rank);
                elements.push(card.element());
            }
            None => has_joker = true,
        }
    }

    Some(Resolution {
        kind,
        value: value.unwrap_or(joker_value),
        elements: if has_joker {
            Element::ALL.to_vec()
        } else {
            elements
        },
        positions: positions.to_vec(),
    })
}
