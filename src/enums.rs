use serde::{Deserialize, Serialize};
use std::fmt;

// Resource counts indexed in `RESOURCES` order
pub type FreqDeck = [u8; 5];

/// Identity token of a seat. Each match hands these out in `COLORS` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Red = 0,
    Blue = 1,
    White = 2,
    Orange = 3,
}

pub const COLORS: [Color; 4] = [Color::Red, Color::Blue, Color::White, Color::Orange];

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::White => "WHITE",
            Color::Orange => "ORANGE",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Human,
    Automated,
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatType::Human => write!(f, "human"),
            SeatType::Automated => write!(f, "automated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

pub const RESOURCES: [Resource; 5] = [
    Resource::Wood,
    Resource::Brick,
    Resource::Sheep,
    Resource::Wheat,
    Resource::Ore,
];

impl Resource {
    pub fn index(self) -> usize {
        match self {
            Resource::Wood => 0,
            Resource::Brick => 1,
            Resource::Sheep => 2,
            Resource::Wheat => 3,
            Resource::Ore => 4,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_colors_are_distinct() {
        let unique: HashSet<Color> = COLORS.iter().copied().collect();
        assert_eq!(unique.len(), COLORS.len());
    }

    #[test]
    fn test_color_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Color::White).unwrap(), "\"WHITE\"");
        assert_eq!(Color::Orange.to_string(), "ORANGE");
    }

    #[test]
    fn test_resource_index_matches_table() {
        for (i, resource) in RESOURCES.iter().enumerate() {
            assert_eq!(resource.index(), i);
        }
    }
}
