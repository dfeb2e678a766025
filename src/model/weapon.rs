use serde::{Deserialize, Serialize};

use super::{FieldKind, GearId, GearRecord};

/// A weapon from the catalog
///
/// `damage` is free text because catalog entries use values such as `"+2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    #[serde(rename = "_id")]
    pub id: GearId,

    #[serde(rename = "type")]
    pub weapon_type: String,

    pub name: String,

    pub skill: String,

    pub damage: String,

    pub critical: i64,

    pub range: String,

    // Persisted documents use this spelling
    #[serde(rename = "encumberence", alias = "encumbrance")]
    pub encumbrance: i64,

    #[serde(rename = "hp")]
    pub hit_points: i64,

    pub price: i64,

    pub rarity: i64,

    pub special: String,
}

impl GearRecord for Weapon {
    const KIND: &'static str = "weapon";

    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("type", FieldKind::Text),
        ("name", FieldKind::Text),
        ("skill", FieldKind::Text),
        ("damage", FieldKind::Text),
        ("critical", FieldKind::Integer),
        ("range", FieldKind::Text),
        ("encumberence", FieldKind::Integer),
        ("hp", FieldKind::Integer),
        ("price", FieldKind::Integer),
        ("rarity", FieldKind::Integer),
        ("special", FieldKind::Text),
    ];

    const FIELD_ALIASES: &'static [(&'static str, &'static str)] =
        &[("encumbrance", "encumberence")];

    fn id(&self) -> GearId {
        self.id
    }

    fn set_id(&mut self, id: GearId) {
        self.id = id;
    }
}
