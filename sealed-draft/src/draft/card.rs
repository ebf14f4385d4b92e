// Card representation: identity, ink color, rarity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six ink colors a card can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Amber,
    Amethyst,
    Emerald,
    Ruby,
    Sapphire,
    Steel,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Amber,
        Color::Amethyst,
        Color::Emerald,
        Color::Ruby,
        Color::Sapphire,
        Color::Steel,
    ];

    /// Parse a color label, ignoring case and surrounding whitespace.
    pub fn from_label(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Color::ALL
            .into_iter()
            .find(|c| c.display_str().eq_ignore_ascii_case(trimmed))
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Color::Amber => "Amber",
            Color::Amethyst => "Amethyst",
            Color::Emerald => "Emerald",
            Color::Ruby => "Ruby",
            Color::Sapphire => "Sapphire",
            Color::Steel => "Steel",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Card rarity, ordered from least to most powerful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    #[serde(rename = "Super Rare", alias = "SuperRare", alias = "Super_rare")]
    SuperRare,
    Legendary,
    Epic,
    Iconic,
    Enchanted,
    Special,
}

impl Rarity {
    /// Parse a rarity label as printed on the card ("Super Rare", "super_rare", ...).
    pub fn from_label(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "superrare" => Some(Rarity::SuperRare),
            "legendary" => Some(Rarity::Legendary),
            "epic" => Some(Rarity::Epic),
            "iconic" => Some(Rarity::Iconic),
            "enchanted" => Some(Rarity::Enchanted),
            "special" => Some(Rarity::Special),
            _ => None,
        }
    }

    /// Removal-bias rank. Unranked cards sit at 0, below Common.
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::SuperRare => 4,
            Rarity::Legendary => 5,
            Rarity::Epic => 6,
            Rarity::Iconic => 7,
            Rarity::Enchanted => 8,
            Rarity::Special => 9,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::SuperRare => "Super Rare",
            Rarity::Legendary => "Legendary",
            Rarity::Epic => "Epic",
            Rarity::Iconic => "Iconic",
            Rarity::Enchanted => "Enchanted",
            Rarity::Special => "Special",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A single card from the catalog. Never mutated after it is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub full_name: String,
    pub color: Color,
    #[serde(default)]
    pub cost: Option<u8>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    /// Image URL or path, passed through untouched.
    #[serde(default)]
    pub image: Option<String>,
}

impl Card {
    /// Rarity rank used by the removal policy; 0 when the card has no rarity.
    pub fn rarity_rank(&self) -> u8 {
        self.rarity.map(|r| r.rank()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_from_label_is_case_insensitive() {
        assert_eq!(Color::from_label("amber"), Some(Color::Amber));
        assert_eq!(Color::from_label(" STEEL "), Some(Color::Steel));
        assert_eq!(Color::from_label("Purple"), None);
    }

    #[test]
    fn rarity_ranks_are_strictly_increasing() {
        let order = [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::SuperRare,
            Rarity::Legendary,
            Rarity::Epic,
            Rarity::Iconic,
            Rarity::Enchanted,
            Rarity::Special,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank(), "{} should rank below {}", pair[0], pair[1]);
        }
        assert_eq!(Rarity::Common.rank(), 1);
    }

    #[test]
    fn rarity_from_label_accepts_printed_spellings() {
        assert_eq!(Rarity::from_label("Super Rare"), Some(Rarity::SuperRare));
        assert_eq!(Rarity::from_label("super_rare"), Some(Rarity::SuperRare));
        assert_eq!(Rarity::from_label("Enchanted"), Some(Rarity::Enchanted));
        assert_eq!(Rarity::from_label("Promo"), None);
    }

    #[test]
    fn missing_rarity_ranks_zero() {
        let card = Card {
            id: "x".into(),
            full_name: "Nobody - Placeholder".into(),
            color: Color::Ruby,
            cost: None,
            rarity: None,
            image: None,
        };
        assert_eq!(card.rarity_rank(), 0);
    }

    #[test]
    fn card_deserializes_camel_case_record() {
        let json = r#"{"id":"1","fullName":"Mickey Mouse - Brave Little Tailor","color":"Amber","cost":8,"rarity":"Legendary"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.full_name, "Mickey Mouse - Brave Little Tailor");
        assert_eq!(card.color, Color::Amber);
        assert_eq!(card.cost, Some(8));
        assert_eq!(card.rarity, Some(Rarity::Legendary));
        assert!(card.image.is_none());
    }

    #[test]
    fn super_rare_serializes_with_space() {
        let s = serde_json::to_string(&Rarity::SuperRare).unwrap();
        assert_eq!(s, "\"Super Rare\"");
    }
}
