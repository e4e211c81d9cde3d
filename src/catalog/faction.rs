//! The nine factions, their colors and icon tokens.

/// Fixed allegiance a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Lannister,
    Stark,
    Baratheon,
    Tyrell,
    NightsWatch,
    Greyjoy,
    Targaryen,
    Martell,
    Neutral,
}

impl Faction {
    /// Every faction, in display order.
    pub const ALL: [Faction; 9] = [
        Self::Lannister,
        Self::Stark,
        Self::Baratheon,
        Self::Tyrell,
        Self::NightsWatch,
        Self::Greyjoy,
        Self::Targaryen,
        Self::Martell,
        Self::Neutral,
    ];

    /// Parse a ThronesDB faction code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(code))
    }

    /// ThronesDB faction code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lannister => "lannister",
            Self::Stark => "stark",
            Self::Baratheon => "baratheon",
            Self::Tyrell => "tyrell",
            Self::NightsWatch => "thenightswatch",
            Self::Greyjoy => "greyjoy",
            Self::Targaryen => "targaryen",
            Self::Martell => "martell",
            Self::Neutral => "neutral",
        }
    }

    /// Attachment color bar (`#RRGGBB`).
    pub fn color(&self) -> &'static str {
        match self {
            Self::Lannister => "#b30000",
            Self::Stark => "#a6a6a6",
            Self::Baratheon => "#e6b800",
            Self::Tyrell => "#009900",
            Self::NightsWatch => "#404040",
            Self::Greyjoy => "#006699",
            Self::Targaryen => "#000000",
            Self::Martell => "#ff9900",
            Self::Neutral => "#664400",
        }
    }

    /// Custom emoji token, e.g. `:_gotstark:`.
    pub fn icon(&self) -> String {
        format!(":_got{}:", self.code())
    }

    /// Position in [`Faction::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}
