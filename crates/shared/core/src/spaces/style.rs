use serde::{Deserialize, Serialize};

/// Visual style of a space; doubles as the market statistics category key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleCategory {
    Modern,
    Futuristic,
    Natural,
    Fantasy,
    Cyberpunk,
    Minimalist,
}

impl StyleCategory {
    /// All supported styles
    pub const ALL: [StyleCategory; 6] = [
        StyleCategory::Modern,
        StyleCategory::Futuristic,
        StyleCategory::Natural,
        StyleCategory::Fantasy,
        StyleCategory::Cyberpunk,
        StyleCategory::Minimalist,
    ];

    /// Scarcity score in [0, 1]; rarer styles command higher valuations
    pub fn rarity(&self) -> f64 {
        match self {
            StyleCategory::Modern => 0.2,
            StyleCategory::Minimalist => 0.3,
            StyleCategory::Natural => 0.4,
            StyleCategory::Futuristic => 0.6,
            StyleCategory::Cyberpunk => 0.8,
            StyleCategory::Fantasy => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleCategory::Modern => "modern",
            StyleCategory::Futuristic => "futuristic",
            StyleCategory::Natural => "natural",
            StyleCategory::Fantasy => "fantasy",
            StyleCategory::Cyberpunk => "cyberpunk",
            StyleCategory::Minimalist => "minimalist",
        }
    }
}

impl Default for StyleCategory {
    fn default() -> Self {
        StyleCategory::Modern
    }
}

impl std::fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
