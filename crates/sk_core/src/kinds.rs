use serde::{Deserialize, Serialize};

/// Projectile variants. Each one has its own pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Player's forward cannon.
    FrontCannon,
    /// Player's anti-air cannon.
    TopCannon,
    /// Shell fired by enemy tanks.
    EnemyTank,
    /// Plasma shot dropped by UFOs.
    Ufo,
}

impl ProjectileKind {
    pub fn all() -> &'static [ProjectileKind] {
        &[Self::FrontCannon, Self::TopCannon, Self::EnemyTank, Self::Ufo]
    }

    /// Whether the projectile was fired by the player.
    pub fn is_friendly(&self) -> bool {
        matches!(self, Self::FrontCannon | Self::TopCannon)
    }
}

/// Enemy variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Ufo,
    Turret,
    Tank,
}

impl EnemyKind {
    pub fn all() -> &'static [EnemyKind] {
        &[Self::Ufo, Self::Turret, Self::Tank]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ufo => "UFO",
            Self::Turret => "Turret",
            Self::Tank => "Tank",
        }
    }
}

/// Terrain chunk container variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChunkKind {
    /// Painted procedurally; wiped when returned to the pool.
    #[default]
    Customizable,
    /// Pre-baked obstacle with a small gap.
    HoleSmall,
    /// Pre-baked obstacle with a wide gap.
    HoleBig,
}

impl ChunkKind {
    pub fn all() -> &'static [ChunkKind] {
        &[Self::Customizable, Self::HoleSmall, Self::HoleBig]
    }

    /// Fixed-shape chunks keep their cells across pool round trips.
    pub fn is_customizable(&self) -> bool {
        matches!(self, Self::Customizable)
    }
}

/// One-shot visual effects spawned on deaths and impacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    #[default]
    Explosion,
    SmallExplosion,
}

impl EffectKind {
    pub fn all() -> &'static [EffectKind] {
        &[Self::Explosion, Self::SmallExplosion]
    }

    /// Seconds an effect of this kind stays on screen.
    pub fn duration(&self) -> f32 {
        match self {
            Self::Explosion => 0.8,
            Self::SmallExplosion => 0.4,
        }
    }
}
