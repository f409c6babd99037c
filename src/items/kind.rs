//! Closed set of placeable item kinds
//!
//! Categories and subtypes arrive as strings from tool buttons and save
//! files; they are parsed once into [`ItemKind`] and matched exhaustively
//! from then on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GardenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Tree,
    Flower,
    Furniture,
    Decoration,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Tree,
        ItemCategory::Flower,
        ItemCategory::Furniture,
        ItemCategory::Decoration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Tree => "tree",
            ItemCategory::Flower => "flower",
            ItemCategory::Furniture => "furniture",
            ItemCategory::Decoration => "decoration",
        }
    }
}

impl FromStr for ItemCategory {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self> {
        ItemCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| GardenError::UnknownItemType(s.to_string()))
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Oak,
    Pine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowerKind {
    Rose,
    Tulip,
    Sunflower,
    Lily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FurnitureKind {
    Bench,
    Table,
    Fountain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Lamp,
    Stone,
    Path,
}

/// A category together with one of its subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Tree(TreeKind),
    Flower(FlowerKind),
    Furniture(FurnitureKind),
    Decoration(DecorationKind),
}

impl ItemKind {
    /// Every kind, in tool-panel order
    pub const ALL: [ItemKind; 12] = [
        ItemKind::Tree(TreeKind::Oak),
        ItemKind::Tree(TreeKind::Pine),
        ItemKind::Flower(FlowerKind::Rose),
        ItemKind::Flower(FlowerKind::Tulip),
        ItemKind::Flower(FlowerKind::Sunflower),
        ItemKind::Flower(FlowerKind::Lily),
        ItemKind::Furniture(FurnitureKind::Bench),
        ItemKind::Furniture(FurnitureKind::Table),
        ItemKind::Furniture(FurnitureKind::Fountain),
        ItemKind::Decoration(DecorationKind::Lamp),
        ItemKind::Decoration(DecorationKind::Stone),
        ItemKind::Decoration(DecorationKind::Path),
    ];

    /// Parses a `(category, subtype)` pair such as `("tree", "oak")`
    ///
    /// # Returns
    /// [`GardenError::UnknownItemType`] for an unknown category,
    /// [`GardenError::UnknownSubtype`] for an unknown subtype of a known one
    pub fn parse(category: &str, subtype: &str) -> Result<Self> {
        Self::from_parts(category.parse()?, subtype)
    }

    pub fn from_parts(category: ItemCategory, subtype: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.category() == category && kind.subtype() == subtype)
            .ok_or_else(|| GardenError::UnknownSubtype {
                category: category.to_string(),
                subtype: subtype.to_string(),
            })
    }

    pub fn category(&self) -> ItemCategory {
        match self {
            ItemKind::Tree(_) => ItemCategory::Tree,
            ItemKind::Flower(_) => ItemCategory::Flower,
            ItemKind::Furniture(_) => ItemCategory::Furniture,
            ItemKind::Decoration(_) => ItemCategory::Decoration,
        }
    }

    pub fn subtype(&self) -> &'static str {
        match self {
            ItemKind::Tree(TreeKind::Oak) => "oak",
            ItemKind::Tree(TreeKind::Pine) => "pine",
            ItemKind::Flower(FlowerKind::Rose) => "rose",
            ItemKind::Flower(FlowerKind::Tulip) => "tulip",
            ItemKind::Flower(FlowerKind::Sunflower) => "sunflower",
            ItemKind::Flower(FlowerKind::Lily) => "lily",
            ItemKind::Furniture(FurnitureKind::Bench) => "bench",
            ItemKind::Furniture(FurnitureKind::Table) => "table",
            ItemKind::Furniture(FurnitureKind::Fountain) => "fountain",
            ItemKind::Decoration(DecorationKind::Lamp) => "lamp",
            ItemKind::Decoration(DecorationKind::Stone) => "stone",
            ItemKind::Decoration(DecorationKind::Path) => "path",
        }
    }

    /// Family name used as the id prefix
    pub fn class_name(&self) -> &'static str {
        match self {
            ItemKind::Tree(_) => "TreeItem",
            ItemKind::Flower(_) => "FlowerItem",
            ItemKind::Furniture(_) => "FurnitureItem",
            ItemKind::Decoration(_) => "DecorationItem",
        }
    }

    /// Only lamps carry lights that react to night mode
    pub fn has_lights(&self) -> bool {
        matches!(self, ItemKind::Decoration(DecorationKind::Lamp))
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category(), self.subtype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_pairs() {
        assert_eq!(
            ItemKind::parse("decoration", "lamp").unwrap(),
            ItemKind::Decoration(DecorationKind::Lamp)
        );
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::parse(kind.category().as_str(), kind.subtype()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_category_and_subtype_are_distinct_errors() {
        assert!(matches!(
            ItemKind::parse("spaceship", "oak"),
            Err(GardenError::UnknownItemType(ref c)) if c == "spaceship"
        ));
        assert!(matches!(
            ItemKind::parse("tree", "palm"),
            Err(GardenError::UnknownSubtype { ref subtype, .. }) if subtype == "palm"
        ));
        // subtypes are not shared across categories
        assert!(ItemKind::parse("flower", "oak").is_err());
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&ItemCategory::Furniture).unwrap();
        assert_eq!(json, "\"furniture\"");
        let back: ItemCategory = serde_json::from_str("\"tree\"").unwrap();
        assert_eq!(back, ItemCategory::Tree);
    }

    #[test]
    fn test_only_lamps_have_lights() {
        let lit: Vec<_> = ItemKind::ALL.into_iter().filter(ItemKind::has_lights).collect();
        assert_eq!(lit, vec![ItemKind::Decoration(DecorationKind::Lamp)]);
    }
}
