use bitflags::bitflags;

bitflags! {
    /// Physics layers reported by the collision collaborator.
    ///
    /// The core never runs the overlap test itself; it only receives one
    /// overlap per contact carrying the other collider's layers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u8 {
        const GROUND = 0b0000_0001;
        const PLAYER = 0b0000_0010;
        const PLAYER_BULLETS = 0b0000_0100;
        const ENEMY_BULLETS = 0b0000_1000;
        const ENEMIES = 0b0001_0000;
        const BOUNDARIES = 0b0010_0000;
    }
}

impl CollisionLayers {
    /// Layers that destroy a projectile with a visible explosion.
    pub const EXPLODES_PROJECTILE: Self = Self::GROUND
        .union(Self::PLAYER_BULLETS)
        .union(Self::ENEMY_BULLETS);

    /// Layers that kill an enemy on contact.
    pub const KILLS_ENEMY: Self = Self::PLAYER_BULLETS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_do_not_explode_projectiles() {
        assert!(!CollisionLayers::EXPLODES_PROJECTILE.intersects(CollisionLayers::BOUNDARIES));
        assert!(CollisionLayers::EXPLODES_PROJECTILE.contains(CollisionLayers::GROUND));
    }
}
