use bevy::math::Vec2;
use rand::Rng;
use sk_core::{
    CollisionLayers, EffectKind, EnemyKind, FloatRange, Poolable, ProjectileKind, Spawnable,
};

use crate::signal::ActorSignal;

/// Movement and lifetime strategy of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behaviour {
    /// Stays where it spawned.
    Stationary,
    /// Drives horizontally at a constant speed.
    Drive { speed: f32 },
    /// Hovers for a while, then flies off and leaves the scene.
    Visit {
        time_on_scene: FloatRange,
        fly_away_for: f32,
        fly_speed: f32,
    },
}

/// Fixed tuning of one enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    pub score: u32,
    pub shoot_interval: FloatRange,
    pub projectile: ProjectileKind,
    pub fire_direction: Vec2,
    pub explosion: EffectKind,
    pub behaviour: Behaviour,
}

impl EnemyProfile {
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Ufo => Self {
                score: 30,
                shoot_interval: FloatRange::new(1.5, 3.0),
                projectile: ProjectileKind::Ufo,
                fire_direction: Vec2::NEG_Y,
                explosion: EffectKind::Explosion,
                behaviour: Behaviour::Visit {
                    time_on_scene: FloatRange::new(6.0, 10.0),
                    fly_away_for: 2.0,
                    fly_speed: 5.0,
                },
            },
            EnemyKind::Turret => Self {
                score: 10,
                shoot_interval: FloatRange::new(2.0, 4.0),
                projectile: ProjectileKind::EnemyTank,
                fire_direction: Vec2::new(-1.0, 1.0),
                explosion: EffectKind::Explosion,
                behaviour: Behaviour::Stationary,
            },
            EnemyKind::Tank => Self {
                score: 20,
                shoot_interval: FloatRange::new(2.5, 3.5),
                projectile: ProjectileKind::EnemyTank,
                fire_direction: Vec2::new(-1.0, 0.2),
                explosion: EffectKind::Explosion,
                behaviour: Behaviour::Drive { speed: -1.2 },
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyPhase {
    /// Pooled or placed but not yet initialized.
    Idle,
    Active,
    /// Stopped shooting and heading off screen.
    Leaving { remaining: f32 },
    Gone,
}

/// Pooled enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    kind: EnemyKind,
    profile: EnemyProfile,
    position: Vec2,
    phase: EnemyPhase,
    shoot_interval: f32,
    since_shot: f32,
    on_scene_left: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind) -> Self {
        Self {
            kind,
            profile: EnemyProfile::for_kind(kind),
            position: Vec2::ZERO,
            phase: EnemyPhase::Idle,
            shoot_interval: 0.0,
            since_shot: 0.0,
            on_scene_left: 0.0,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn phase(&self) -> EnemyPhase {
        self.phase
    }

    pub fn shoot_interval(&self) -> f32 {
        self.shoot_interval
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.phase, EnemyPhase::Active | EnemyPhase::Leaving { .. })
    }

    /// Put the enemy on stage at `location` with freshly drawn timings.
    pub fn init<R: Rng + ?Sized>(&mut self, location: Vec2, rng: &mut R) {
        self.position = location;
        self.shoot_interval = self.profile.shoot_interval.sample(rng);
        self.since_shot = 0.0;
        self.on_scene_left = match self.profile.behaviour {
            Behaviour::Visit { time_on_scene, .. } => time_on_scene.sample(rng),
            _ => 0.0,
        };
        self.phase = EnemyPhase::Active;
    }

    pub fn tick(&mut self, dt: f32, out: &mut Vec<ActorSignal>) {
        match self.phase {
            EnemyPhase::Active => {
                self.advance(dt);
                if self.phase != EnemyPhase::Active {
                    return;
                }
                self.since_shot += dt;
                if self.shoot_interval > 0.0 && self.since_shot >= self.shoot_interval {
                    self.since_shot -= self.shoot_interval;
                    out.push(ActorSignal::Fire {
                        kind: self.profile.projectile,
                        origin: self.position,
                        direction: self.profile.fire_direction.normalize_or_zero(),
                    });
                }
            }
            EnemyPhase::Leaving { remaining } => {
                if let Behaviour::Visit { fly_speed, .. } = self.profile.behaviour {
                    self.position.y += fly_speed * dt;
                }
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = EnemyPhase::Gone;
                    out.push(ActorSignal::ReturnToPool);
                } else {
                    self.phase = EnemyPhase::Leaving { remaining };
                }
            }
            EnemyPhase::Idle | EnemyPhase::Gone => {}
        }
    }

    fn advance(&mut self, dt: f32) {
        match self.profile.behaviour {
            Behaviour::Stationary => {}
            Behaviour::Drive { speed } => self.position.x += speed * dt,
            Behaviour::Visit { fly_away_for, .. } => {
                self.on_scene_left -= dt;
                if self.on_scene_left <= 0.0 {
                    self.phase = EnemyPhase::Leaving {
                        remaining: fly_away_for,
                    };
                }
            }
        }
    }

    /// React to a contact reported by the collision collaborator.
    pub fn on_overlap(&mut self, layers: CollisionLayers, out: &mut Vec<ActorSignal>) {
        if !self.is_alive() || !layers.intersects(CollisionLayers::KILLS_ENEMY) {
            return;
        }
        self.phase = EnemyPhase::Gone;
        out.push(ActorSignal::Died {
            score: self.profile.score,
            explosion: self.profile.explosion,
            at: self.position,
        });
        out.push(ActorSignal::ReturnToPool);
    }
}

impl Poolable for Enemy {
    type Key = EnemyKind;

    fn key(&self) -> EnemyKind {
        self.kind
    }

    fn on_release(&mut self) {
        self.phase = EnemyPhase::Idle;
        self.since_shot = 0.0;
        self.on_scene_left = 0.0;
    }
}

impl Spawnable for Enemy {
    fn place_at(&mut self, location: Vec2) {
        self.position = location;
    }
}
