use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::SchemaUrn;

/// Reach envelope of a weapon, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponRange {
    /// Distance the weapon was built to fight at.
    pub optimal: f64,
    /// Hard ceiling; beyond this the weapon simply cannot connect.
    pub max: f64,
    /// Present on ranged weapons: distance over which effectiveness halves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub falloff: Option<f64>,
    /// Present on weapons too unwieldy for point-blank use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
}

/// Derived weapon family. The AI keys its whole doctrine off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    Melee,
    Reach,
    Ranged,
}

/// Read-only weapon description resolved from the schema catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSchema {
    pub urn: SchemaUrn,
    pub name: String,
    /// Always positive; a massless weapon is a catalog bug.
    pub base_mass_grams: f64,
    pub range: WeaponRange,
    /// Body slots the weapon occupies while wielded, slot name to count.
    /// Sorted map so serialized schemas are stable.
    #[serde(default)]
    pub fit: BTreeMap<String, u32>,
}

impl WeaponSchema {
    pub fn mass_kg(&self) -> f64 {
        self.base_mass_grams / 1000.0
    }

    /// Two-handed means the fit occupies at least two slots in total.
    pub fn is_two_handed(&self) -> bool {
        self.fit.values().sum::<u32>() >= 2
    }

    /// Falloff marks a ranged weapon; otherwise optimal reach splits
    /// melee (arm's length) from reach (polearm) weapons.
    pub fn classify(&self) -> WeaponClass {
        if self.range.falloff.is_some() {
            WeaponClass::Ranged
        } else if self.range.optimal > 1.0 {
            WeaponClass::Reach
        } else {
            WeaponClass::Melee
        }
    }

    /// Whether a strike can physically connect from `distance_m`.
    pub fn can_hit_from(&self, distance_m: f64) -> bool {
        if distance_m > self.range.max {
            return false;
        }
        match self.range.min {
            Some(min) => distance_m >= min,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(optimal: f64, max: f64, falloff: Option<f64>, min: Option<f64>) -> WeaponSchema {
        WeaponSchema {
            urn: SchemaUrn::from("urn:schema:weapon:test"),
            name: "Test".to_string(),
            base_mass_grams: 1500.0,
            range: WeaponRange { optimal, max, falloff, min },
            fit: BTreeMap::from([("hand.main".to_string(), 1)]),
        }
    }

    #[test]
    fn classification() {
        assert_eq!(weapon(1.0, 1.0, None, None).classify(), WeaponClass::Melee);
        assert_eq!(weapon(2.0, 3.0, None, None).classify(), WeaponClass::Reach);
        assert_eq!(
            weapon(20.0, 80.0, Some(15.0), Some(3.0)).classify(),
            WeaponClass::Ranged
        );
    }

    #[test]
    fn two_handed_counts_slots() {
        let mut polearm = weapon(2.0, 3.0, None, None);
        polearm.fit =
            BTreeMap::from([("hand.main".to_string(), 1), ("hand.off".to_string(), 1)]);
        assert!(polearm.is_two_handed());
        assert!(!weapon(1.0, 1.0, None, None).is_two_handed());
    }

    #[test]
    fn reach_envelope() {
        let bow = weapon(20.0, 80.0, Some(15.0), Some(3.0));
        assert!(bow.can_hit_from(20.0));
        assert!(bow.can_hit_from(80.0));
        assert!(!bow.can_hit_from(80.1));
        assert!(!bow.can_hit_from(2.0)); // inside the minimum
        let sword = weapon(1.0, 1.0, None, None);
        assert!(sword.can_hit_from(0.0));
        assert!(!sword.can_hit_from(1.5));
    }
}
