//! Snapshot - attacker-side inputs frozen when a periodic effect is applied

/// What a periodic effect deals each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodicKind {
    #[default]
    Damage,
    Healing,
}

/// Base value and attacker multiplier captured at apply time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub kind: PeriodicKind,
    pub base: f64,
    /// Damage: spell and attacker multipliers. Healing: caster multiplier.
    pub attacker_multiplier: f64,
}

impl Snapshot {
    pub fn damage(base: f64, attacker_multiplier: f64) -> Self {
        Snapshot {
            kind: PeriodicKind::Damage,
            base,
            attacker_multiplier,
        }
    }

    pub fn healing(base: f64, caster_multiplier: f64) -> Self {
        Snapshot {
            kind: PeriodicKind::Healing,
            base,
            attacker_multiplier: caster_multiplier,
        }
    }

    /// Stage-one output every tick starts from
    pub fn frozen_value(&self) -> f64 {
        self.base * self.attacker_multiplier
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::damage(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_value() {
        let snapshot = Snapshot::damage(50.0, 1.1);
        assert!((snapshot.frozen_value() - 55.0).abs() < 1e-9);
        assert_eq!(Snapshot::healing(10.0, 1.0).kind, PeriodicKind::Healing);
    }
}
