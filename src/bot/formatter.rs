//! Card text formatting for display.
//!
//! Translates the HTML-ish markup used in ThronesDB rules text into Slack
//! mrkdwn and custom emoji tokens. Literal brackets cannot be escaped.

use crate::catalog::Faction;

/// Unique card marker.
pub const UNIQUE_ICON: &str = ":_gotunique:";

/// Challenge icons shown next to a character's strength.
pub const MILITARY_ICON: &str = ":_gotmil:";
pub const INTRIGUE_ICON: &str = ":_gotint:";
pub const POWER_ICON: &str = ":_gotpow:";

/// Fixed tag substitutions, applied in order.
const SUBSTITUTIONS: [(&str, &str); 9] = [
    ("<b>", "*"),
    ("</b>", "*"),
    ("<i>", " _*"),
    ("</i>", "*_ "),
    ("<abbr>", "_"),
    ("</abbr>", "_"),
    ("[intrigue]", ":_gotint_text:"),
    ("[military]", ":_gotmil_text:"),
    ("[power]", ":_gotpow_text:"),
];

/// Format rules text for Slack.
///
/// Bold becomes `*`, italics become ` _*`/`*_ `, abbreviations become `_`,
/// challenge keywords and bracketed faction codes (e.g. `[stark]`) become
/// their emoji tokens.
pub fn format_text(text: &str) -> String {
    let mut formatted = SUBSTITUTIONS
        .iter()
        .fold(text.to_string(), |acc, (tag, replacement)| {
            acc.replace(tag, replacement)
        });

    for faction in Faction::ALL {
        formatted = formatted.replace(&format!("[{}]", faction.code()), &faction.icon());
    }

    formatted
}
