//! Core card types.
//!
//! Cards are rendered with chat-style emoji shortcodes (`:fire:`, `:one:`),
//! which is how players are used to seeing them at the table.

use serde::{Deserialize, Serialize};

/// Highest rank that has an emoji rendering.
pub const MAX_RANK: u8 = 8;

/// The element carried by a suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// Diamonds.
    Air,
    /// Clubs.
    Earth,
    /// Hearts.
    Fire,
    /// Spades.
    Ice,
    /// Jokers carry no element.
    None,
}

impl Element {
    /// The four real elements, in the order offered by joker resolutions.
    pub const ALL: [Element; 4] = [Element::Air, Element::Earth, Element::Fire, Element::Ice];

    /// Emoji shortcode for this element.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Air => ":cloud_tornado:",
            Self::Earth => ":rock:",
            Self::Fire => ":fire:",
            Self::Ice => ":snowflake:",
            Self::None => "❓",
        }
    }
}

/// A card suit: its display symbol and element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suit {
    /// Display symbol, e.g. `:hearts: = :fire:`.
    pub symbol: String,
    /// Element of the suit.
    pub element: Element,
}

impl Suit {
    /// The suit for a real element, or the joker suit for [`Element::None`].
    #[must_use]
    pub fn of(element: Element) -> Self {
        let symbol = match element {
            Element::Air => ":diamonds: = :cloud_tornado:",
            Element::Fire => ":hearts: = :fire:",
            Element::Ice => ":spades: = :snowflake:",
            Element::Earth => ":clubs: = :rock:",
            Element::None => ":black_joker:",
        };
        Self {
            symbol: symbol.to_string(),
            element,
        }
    }

    /// The suit shared by all jokers.
    #[must_use]
    pub fn joker() -> Self {
        Self::of(Element::None)
    }
}

/// A single card. Jokers have no rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Rank of a numbered card; `None` for a joker.
    pub rank: Option<u8>,
    /// Suit of the card.
    pub suit: Suit,
}

impl Card {
    /// Create a numbered card.
    #[must_use]
    pub fn numbered(rank: u8, element: Element) -> Self {
        Self {
            rank: Some(rank),
            suit: Suit::of(element),
        }
    }

    /// Create a joker.
    #[must_use]
    pub fn joker() -> Self {
        Self {
            rank: None,
            suit: Suit::joker(),
        }
    }

    /// Check if this card is a joker.
    #[must_use]
    pub fn is_joker(&self) -> bool {
        self.rank.is_none()
    }

    /// Element of the card's suit.
    #[must_use]
    pub fn element(&self) -> Element {
        self.suit.element
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", rank_emoji(self.rank), self.suit.symbol)
    }
}

/// Emoji shortcode for a rank. Jokers and unknown ranks render as a question mark.
#[must_use]
pub fn rank_emoji(rank: Option<u8>) -> &'static str {
    match rank {
        Some(1) => ":one:",
        Some(2) => ":two:",
        Some(3) => ":three:",
        Some(4) => ":four:",
        Some(5) => ":five:",
        Some(6) => ":six:",
        Some(7) => ":seven:",
        Some(8) => ":eight:",
        Some(_) | None => ":question:",
    }
}
