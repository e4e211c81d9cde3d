//! Reply payloads built from catalog entities.

use crate::bot::formatter::{format_text, INTRIGUE_ICON, MILITARY_ICON, POWER_ICON, UNIQUE_ICON};
use crate::catalog::{Card, CardType, Faction, Stat};
use crate::common::error::ResponseError;
use crate::common::{Attachment, AttachmentField};

/// Shown when a stat is missing where the card type should print one.
const MISSING_STAT: &str = "-";

/// Builds Slack attachments for cards and packs.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    /// Site root that card image paths are relative to.
    site_url: String,
}

impl ResponseBuilder {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the single attachment describing one card.
    pub fn build_card_response(&self, card: &Card) -> Result<Vec<Attachment>, ResponseError> {
        let faction = faction_of(card)?;
        let card_type = card.card_type();

        let mut pretext = String::new();
        if card.is_unique {
            pretext.push_str(UNIQUE_ICON);
            pretext.push(' ');
        }

        // Name links to the card image
        pretext.push_str(&format!(
            "*<{}{}|{}>* \n{} {}. ",
            self.site_url,
            card.imagesrc.as_deref().unwrap_or("/"),
            card.name.to_uppercase(),
            faction.icon(),
            card.faction_name
        ));

        if card.is_loyal {
            pretext.push_str("Loyal. ");
        }
        pretext.push_str(&format!("*{}*. ", card.type_name));

        if card_type.has_cost() {
            match &card.cost {
                Some(cost) => pretext.push_str(&format!("Cost: {}. ", cost)),
                None => pretext.push_str("Cost: _*X*_. "),
            }

            if card_type == CardType::Character {
                pretext.push_str(&format!("STR: {}. ", stat(&card.strength)));
                let icons = [
                    (card.is_military, MILITARY_ICON),
                    (card.is_intrigue, INTRIGUE_ICON),
                    (card.is_power, POWER_ICON),
                ];
                for (_, icon) in icons.iter().filter(|(has, _)| *has) {
                    pretext.push_str(&format!(" {} ", icon));
                }
            }
        } else if card_type == CardType::Plot {
            pretext.push_str(&format!(
                "Income: {}. Initiative: {}. Claim: {}. Reserve: {}",
                stat(&card.income),
                stat(&card.initiative),
                stat(&card.claim),
                stat(&card.reserve)
            ));
        }

        if card_type.shows_traits() {
            pretext.push_str(&format!("\n _*{}*_", card.traits));
        }

        let text = format_text(card.text.as_deref().unwrap_or_default());

        Ok(vec![Attachment::new(faction.color())
            .with_pretext(pretext)
            .with_text(text)])
    }

    /// Build one attachment per faction listing the given cards.
    ///
    /// All nine factions are always present, in [`Faction::ALL`] order, so
    /// factions without cards in the pack yield an empty attachment.
    pub fn build_pack_response(&self, cards: &[&Card]) -> Result<Vec<Attachment>, ResponseError> {
        let mut attachments: Vec<Attachment> = Faction::ALL
            .iter()
            .map(|faction| Attachment::new(faction.color()))
            .collect();

        for card in cards {
            let faction = faction_of(card)?;

            let mut title = String::new();
            if card.is_unique {
                title.push_str(UNIQUE_ICON);
                title.push(' ');
            }
            title.push_str(&card.name);

            attachments[faction.index()].fields.push(AttachmentField {
                title,
                value: format!("{} {}", faction.icon(), card.type_name),
                short: true,
            });
        }

        Ok(attachments)
    }
}

fn faction_of(card: &Card) -> Result<Faction, ResponseError> {
    card.faction().ok_or_else(|| ResponseError::UnknownFaction {
        card: card.name.clone(),
        faction: card.faction_code.clone(),
    })
}

fn stat(value: &Option<Stat>) -> String {
    value
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| MISSING_STAT.to_string())
}
