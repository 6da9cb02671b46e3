/// Gameplay tuning for weapons.
///
/// This is the single canonical weapon table; clients receive it inside the `init` config.
use serde::{Deserialize, Serialize};

/// Reserve value reported for weapons with unlimited spare ammo.
pub const INFINITE_RESERVE: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponKind {
    Fist,
    Pistol,
    Rifle,
    Sniper,
    Shotgun,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSpec {
    pub id: WeaponKind,
    pub damage: i32,

    /// Projectile speed in pixels per second (0 for melee).
    pub speed: f32,

    /// Projectile travel distance, or reach for melee weapons.
    pub range: f32,

    pub cooldown_ms: u64,
    pub is_melee: bool,

    /// Rounds per magazine (0 means the weapon uses no ammo).
    pub magazine_size: u32,
    pub max_reserve_ammo: u32,
    pub infinite_ammo: bool,
    pub reload_time_ms: u64,

    /// Projectiles per shot; more than one makes a spread weapon.
    pub pellet_count: u32,

    /// Full spread cone in degrees.
    pub spread_angle: f32,
}

static WEAPONS: [WeaponSpec; 5] = [
    WeaponSpec {
        id: WeaponKind::Fist,
        damage: 10,
        speed: 0.0,
        range: 35.0,
        cooldown_ms: 500,
        is_melee: true,
        magazine_size: 0,
        max_reserve_ammo: 0,
        infinite_ammo: false,
        reload_time_ms: 0,
        pellet_count: 0,
        spread_angle: 0.0,
    },
    WeaponSpec {
        id: WeaponKind::Pistol,
        damage: 20,
        speed: 1000.0,
        range: 500.0,
        cooldown_ms: 1000,
        is_melee: false,
        magazine_size: 7,
        max_reserve_ammo: INFINITE_RESERVE,
        infinite_ammo: true,
        reload_time_ms: 1500,
        pellet_count: 1,
        spread_angle: 0.0,
    },
    WeaponSpec {
        id: WeaponKind::Rifle,
        damage: 20,
        speed: 1000.0,
        range: 1000.0,
        cooldown_ms: 150,
        is_melee: false,
        magazine_size: 30,
        max_reserve_ammo: 60,
        infinite_ammo: false,
        reload_time_ms: 2000,
        pellet_count: 1,
        spread_angle: 0.0,
    },
    WeaponSpec {
        id: WeaponKind::Sniper,
        damage: 100,
        speed: 1500.0,
        range: 1300.0,
        cooldown_ms: 1200,
        is_melee: false,
        magazine_size: 5,
        max_reserve_ammo: 20,
        infinite_ammo: false,
        reload_time_ms: 2500,
        pellet_count: 1,
        spread_angle: 0.0,
    },
    WeaponSpec {
        id: WeaponKind::Shotgun,
        damage: 15,
        speed: 1000.0,
        range: 700.0,
        cooldown_ms: 1200,
        is_melee: false,
        magazine_size: 6,
        max_reserve_ammo: 24,
        infinite_ammo: false,
        reload_time_ms: 2000,
        pellet_count: 12,
        spread_angle: 8.0,
    },
];

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Fist,
        WeaponKind::Pistol,
        WeaponKind::Rifle,
        WeaponKind::Sniper,
        WeaponKind::Shotgun,
    ];

    pub fn spec(self) -> &'static WeaponSpec {
        &WEAPONS[self as usize]
    }

    /// The sidearm always lives in its own inventory slot.
    pub fn is_sidearm(self) -> bool {
        self == WeaponKind::Pistol
    }
}

impl WeaponSpec {
    pub fn uses_ammo(&self) -> bool {
        !self.is_melee && self.magazine_size > 0
    }

    /// Reserve ammo a freshly dropped weapon carries.
    pub fn starting_reserve(&self) -> u32 {
        if self.infinite_ammo {
            INFINITE_RESERVE
        } else {
            self.max_reserve_ammo
        }
    }
}

pub fn weapon_table() -> &'static [WeaponSpec] {
    &WEAPONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_looking_up_each_kind_then_table_entry_matches() {
        for kind in WeaponKind::ALL {
            assert_eq!(kind.spec().id, kind);
        }
    }

    #[test]
    fn when_weapon_kind_is_serialized_then_uses_upper_case_names() {
        let json = serde_json::to_string(&WeaponKind::Shotgun).expect("serialize");
        assert_eq!(json, "\"SHOTGUN\"");
        let parsed: WeaponKind = serde_json::from_str("\"PISTOL\"").expect("parse");
        assert_eq!(parsed, WeaponKind::Pistol);
    }

    #[test]
    fn when_weapon_has_infinite_ammo_then_reserve_uses_display_sentinel() {
        assert_eq!(WeaponKind::Pistol.spec().starting_reserve(), INFINITE_RESERVE);
        assert_eq!(WeaponKind::Rifle.spec().starting_reserve(), 60);
        assert!(!WeaponKind::Fist.spec().uses_ammo());
    }
}
