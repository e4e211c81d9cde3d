//! Card records as served by the ThronesDB public API.

use std::fmt;

use serde::Deserialize;

use crate::catalog::faction::Faction;

/// A printed stat. Mostly numbers, but ThronesDB uses strings such as `"X"`
/// or `"-"` for variable values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Stat {
    Number(i64),
    Text(String),
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Number(n) => write!(f, "{}", n),
            Stat::Text(s) => f.write_str(s),
        }
    }
}

/// Card type, from `type_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Character,
    Attachment,
    Event,
    Location,
    Plot,
    Agenda,
    Title,
    Other,
}

impl CardType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "character" => Self::Character,
            "attachment" => Self::Attachment,
            "event" => Self::Event,
            "location" => Self::Location,
            "plot" => Self::Plot,
            "agenda" => Self::Agenda,
            "title" => Self::Title,
            _ => Self::Other,
        }
    }

    /// Whether cards of this type are paid for with gold.
    pub fn has_cost(&self) -> bool {
        matches!(
            self,
            Self::Character | Self::Attachment | Self::Event | Self::Location
        )
    }

    /// Whether cards of this type print a traits line.
    pub fn shows_traits(&self) -> bool {
        matches!(
            self,
            Self::Plot | Self::Character | Self::Attachment | Self::Location
        )
    }
}

/// One card of the reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub name: String,
    pub faction_code: String,
    #[serde(default)]
    pub faction_name: String,
    pub type_code: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_loyal: bool,
    #[serde(default)]
    pub cost: Option<Stat>,
    #[serde(default)]
    pub strength: Option<Stat>,
    #[serde(default)]
    pub income: Option<Stat>,
    #[serde(default)]
    pub initiative: Option<Stat>,
    #[serde(default)]
    pub claim: Option<Stat>,
    #[serde(default)]
    pub reserve: Option<Stat>,
    #[serde(default)]
    pub is_military: bool,
    #[serde(default)]
    pub is_intrigue: bool,
    #[serde(default)]
    pub is_power: bool,
    #[serde(default)]
    pub traits: String,
    #[serde(default)]
    pub text: Option<String>,
    pub pack_code: String,
    #[serde(default)]
    pub pack_name: String,
    /// Image path relative to the site root.
    #[serde(default)]
    pub imagesrc: Option<String>,
}

impl Card {
    pub fn card_type(&self) -> CardType {
        CardType::from_code(&self.type_code)
    }

    /// The card's faction, `None` when the code is not one of the nine.
    pub fn faction(&self) -> Option<Faction> {
        Faction::from_code(&self.faction_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_thronesdb_character() {
        let card: Card = serde_json::from_str(
            r#"{
                "pack_code": "Core", "pack_name": "Core Set", "type_code": "character",
                "type_name": "Character", "faction_code": "stark", "faction_name": "House Stark",
                "position": 144, "code": "01144", "name": "Eddard Stark", "cost": 7,
                "text": "Renown.", "quantity": 1, "income": null, "initiative": null,
                "claim": null, "reserve": null, "deck_limit": 3, "strength": 6,
                "traits": "Lord. Noble.", "flavor": "", "illustrator": "", "is_unique": true,
                "is_loyal": true, "is_military": true, "is_intrigue": false, "is_power": true,
                "octgn_id": null, "url": "", "imagesrc": "/bundles/cards/01144.png",
                "label": "Eddard Stark", "ci": 7, "si": 6
            }"#,
        )
        .unwrap();

        assert_eq!(card.name, "Eddard Stark");
        assert_eq!(card.cost, Some(Stat::Number(7)));
        assert_eq!(card.income, None);
        assert_eq!(card.faction(), Some(Faction::Stark));
        assert_eq!(card.card_type(), CardType::Character);
        assert!(card.is_unique && card.is_loyal && card.is_power);
    }

    #[test]
    fn test_variable_stat_text() {
        let card: Card = serde_json::from_str(
            r#"{"name": "Ser Gregor", "faction_code": "lannister", "type_code": "event",
                "pack_code": "Core", "cost": "X"}"#,
        )
        .unwrap();
        assert_eq!(card.cost.unwrap().to_string(), "X");
        assert!(card.text.is_none());
    }

    #[test]
    fn test_card_type_groups() {
        assert!(CardType::Event.has_cost());
        assert!(!CardType::Event.shows_traits());
        assert!(CardType::Plot.shows_traits());
        assert!(!CardType::Plot.has_cost());
        assert_eq!(CardType::from_code("treachery"), CardType::Other);
    }
}
