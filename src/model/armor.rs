use serde::{Deserialize, Serialize};

use super::{FieldKind, GearId, GearRecord};

/// A piece of armor from the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Armor {
    #[serde(rename = "_id")]
    pub id: GearId,

    #[serde(rename = "type")]
    pub armor_type: String,

    pub defense: i64,

    pub soak: i64,

    pub price: i64,

    pub encumbrance: i64,

    #[serde(rename = "hardPoints")]
    pub hard_points: i64,

    pub rarity: i64,
}

impl GearRecord for Armor {
    const KIND: &'static str = "armor";

    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("type", FieldKind::Text),
        ("defense", FieldKind::Integer),
        ("soak", FieldKind::Integer),
        ("price", FieldKind::Integer),
        ("encumbrance", FieldKind::Integer),
        ("hardPoints", FieldKind::Integer),
        ("rarity", FieldKind::Integer),
    ];

    fn id(&self) -> GearId {
        self.id
    }

    fn set_id(&mut self, id: GearId) {
        self.id = id;
    }
}
