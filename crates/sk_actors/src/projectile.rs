use bevy::math::Vec2;
use sk_core::{CollisionLayers, EffectKind, Poolable, ProjectileKind, Spawnable};

use crate::signal::ActorSignal;

/// Fixed tuning of one projectile kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileProfile {
    /// World units per second.
    pub speed: f32,
    /// Seconds before the projectile blows up on its own.
    pub ttl: Option<f32>,
    pub explosion: EffectKind,
    /// Layer the projectile collides on.
    pub layer: CollisionLayers,
}

impl ProjectileProfile {
    pub fn for_kind(kind: ProjectileKind) -> Self {
        match kind {
            ProjectileKind::FrontCannon => Self {
                speed: 14.0,
                ttl: None,
                explosion: EffectKind::SmallExplosion,
                layer: CollisionLayers::PLAYER_BULLETS,
            },
            ProjectileKind::TopCannon => Self {
                speed: 11.0,
                ttl: Some(0.9),
                explosion: EffectKind::SmallExplosion,
                layer: CollisionLayers::PLAYER_BULLETS,
            },
            ProjectileKind::EnemyTank => Self {
                speed: 6.0,
                ttl: None,
                explosion: EffectKind::SmallExplosion,
                layer: CollisionLayers::ENEMY_BULLETS,
            },
            ProjectileKind::Ufo => Self {
                speed: 4.5,
                ttl: Some(3.0),
                explosion: EffectKind::Explosion,
                layer: CollisionLayers::ENEMY_BULLETS,
            },
        }
    }
}

/// Pooled projectile.
#[derive(Debug, Clone)]
pub struct Projectile {
    kind: ProjectileKind,
    profile: ProjectileProfile,
    position: Vec2,
    direction: Vec2,
    age: f32,
    in_flight: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind) -> Self {
        Self {
            kind,
            profile: ProjectileProfile::for_kind(kind),
            position: Vec2::ZERO,
            direction: Vec2::ZERO,
            age: 0.0,
            in_flight: false,
        }
    }

    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    pub fn profile(&self) -> &ProjectileProfile {
        &self.profile
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Launch from `origin`. A zero direction leaves the projectile parked.
    pub fn fire(&mut self, origin: Vec2, direction: Vec2) {
        self.position = origin;
        self.direction = direction.normalize_or_zero();
        self.age = 0.0;
        self.in_flight = true;
    }

    pub fn tick(&mut self, dt: f32, out: &mut Vec<ActorSignal>) {
        if !self.in_flight {
            return;
        }
        self.position += self.direction * self.profile.speed * dt;
        self.age += dt;

        if let Some(ttl) = self.profile.ttl {
            if self.age >= ttl {
                self.explode(out);
            }
        }
    }

    /// React to a contact reported by the collision collaborator.
    pub fn on_overlap(&mut self, layers: CollisionLayers, out: &mut Vec<ActorSignal>) {
        if !self.in_flight {
            return;
        }
        if layers.intersects(CollisionLayers::EXPLODES_PROJECTILE) {
            self.explode(out);
        } else if layers.intersects(CollisionLayers::BOUNDARIES) {
            self.in_flight = false;
            out.push(ActorSignal::ReturnToPool);
        }
    }

    fn explode(&mut self, out: &mut Vec<ActorSignal>) {
        self.in_flight = false;
        out.push(ActorSignal::Explode {
            effect: self.profile.explosion,
            at: self.position,
        });
        out.push(ActorSignal::ReturnToPool);
    }
}

impl Poolable for Projectile {
    type Key = ProjectileKind;

    fn key(&self) -> ProjectileKind {
        self.kind
    }

    fn on_acquire(&mut self) {
        self.age = 0.0;
        self.in_flight = false;
    }

    fn on_release(&mut self) {
        self.in_flight = false;
        self.age = 0.0;
        self.direction = Vec2::ZERO;
    }
}

impl Spawnable for Projectile {
    fn place_at(&mut self, location: Vec2) {
        self.position = location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_along_direction_at_kind_speed() {
        let mut shot = Projectile::new(ProjectileKind::FrontCannon);
        let mut out = Vec::new();
        shot.fire(Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0));
        shot.tick(0.5, &mut out);

        assert_eq!(shot.position(), Vec2::new(8.0, 1.0));
        assert!(out.is_empty());
    }

    #[test]
    fn ttl_lapse_explodes_and_returns() {
        let mut shot = Projectile::new(ProjectileKind::TopCannon);
        let mut out = Vec::new();
        shot.fire(Vec2::ZERO, Vec2::Y);

        shot.tick(0.5, &mut out);
        assert!(out.is_empty());
        shot.tick(0.5, &mut out);
        assert_eq!(
            out,
            vec![
                ActorSignal::Explode {
                    effect: EffectKind::SmallExplosion,
                    at: shot.position()
                },
                ActorSignal::ReturnToPool,
            ]
        );

        out.clear();
        shot.tick(1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn ground_and_bullets_explode_boundaries_do_not() {
        for layers in [
            CollisionLayers::GROUND,
            CollisionLayers::PLAYER_BULLETS,
            CollisionLayers::ENEMY_BULLETS,
        ] {
            let mut shot = Projectile::new(ProjectileKind::EnemyTank);
            let mut out = Vec::new();
            shot.fire(Vec2::ZERO, Vec2::X);
            shot.on_overlap(layers, &mut out);
            assert!(matches!(out[0], ActorSignal::Explode { .. }));
            assert_eq!(out[1], ActorSignal::ReturnToPool);
        }

        let mut shot = Projectile::new(ProjectileKind::EnemyTank);
        let mut out = Vec::new();
        shot.fire(Vec2::ZERO, Vec2::X);
        shot.on_overlap(CollisionLayers::BOUNDARIES, &mut out);
        assert_eq!(out, vec![ActorSignal::ReturnToPool]);
    }

    #[test]
    fn unrelated_layers_are_ignored() {
        let mut shot = Projectile::new(ProjectileKind::Ufo);
        let mut out = Vec::new();
        shot.fire(Vec2::ZERO, Vec2::NEG_Y);
        shot.on_overlap(CollisionLayers::ENEMIES, &mut out);
        assert!(out.is_empty());
        assert!(shot.is_in_flight());
    }

    #[test]
    fn second_contact_after_return_is_silent() {
        let mut shot = Projectile::new(ProjectileKind::FrontCannon);
        let mut out = Vec::new();
        shot.fire(Vec2::ZERO, Vec2::X);
        shot.on_overlap(CollisionLayers::GROUND, &mut out);
        shot.on_overlap(CollisionLayers::GROUND, &mut out);
        assert_eq!(out.len(), 2);
    }
}
