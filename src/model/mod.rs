//! # Gear Records
//!
//! Record shapes persisted in the two gear collections, plus the
//! identifier type they share.

mod armor;
mod health;
mod id;
mod weapon;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use armor::Armor;
pub use health::HealthCheckResponse;
pub use id::{GearId, IdError, ID_HEX_LEN, ID_LEN};
pub use weapon::Weapon;

/// Behaviour shared by every record type stored in a gear collection
pub trait GearRecord:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + Unpin + 'static
{
    /// Human-readable record kind, used in messages and route paths
    const KIND: &'static str;

    /// Wire names and kinds of the fields that can be filtered and sorted on
    const FIELDS: &'static [(&'static str, FieldKind)];

    /// Alternate spellings accepted for a field, as `(alias, wire name)`
    const FIELD_ALIASES: &'static [(&'static str, &'static str)] = &[];

    fn id(&self) -> GearId;

    fn set_id(&mut self, id: GearId);

    /// Wire name for `field`, resolving aliases
    fn canonical_field(field: &str) -> &str {
        Self::FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == field)
            .map_or(field, |(_, name)| *name)
    }

    fn field_kind(field: &str) -> Option<FieldKind> {
        Self::FIELDS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }

    /// True if `field` is a filterable field of this record type
    fn is_queryable(field: &str) -> bool {
        Self::field_kind(field).is_some()
    }
}

/// Value type of a queryable record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}
