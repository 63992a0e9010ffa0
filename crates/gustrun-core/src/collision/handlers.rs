//! Standard gameplay reactions.
//!
//! | pair                  | reaction |
//! |-----------------------|----------|
//! | Player / Coin         | coin removed, score and coin count up |
//! | Player / Gift         | gift removed, player state change queued |
//! | Player / Enemy        | stomp or shield defeats the enemy, otherwise the player is hurt |
//! | Player / Spike        | player hurt unless protected |
//! | Player / Goal         | goal marked reached (once) |
//! | Projectile / Enemy    | projectile removed, enemy damaged, coin dropped on defeat |
//! | Projectile / Ground   | projectile removed |
//! | Projectile / Obstacle | projectile removed |

use glam::Vec2;
use tracing::debug;

use crate::command::SpawnRequest;
use crate::components::{
    CollectibleComponent, GiftComponent, GoalComponent, HealthComponent, ProjectileComponent,
    ScoreComponent, Transform,
};
use crate::entity::kinds::{Coin, Enemy, Gift, Goal, Ground, Obstacle, Player, Projectile, Spike};
use crate::entity::Entity;
use crate::events::{CoinCollected, EnemyDefeated, GiftCollected, GoalReached, PlayerDamaged};

use super::{CollisionContext, CollisionRegistry};

/// Minimum downward normal component for a player/enemy contact to count
/// as a stomp.
const STOMP_NORMAL_Y: f32 = 0.5;

/// Damage dealt by one enemy or spike contact.
const CONTACT_DAMAGE: u32 = 1;

/// Installs every reaction in the table above.
pub fn install_default_handlers(registry: &mut CollisionRegistry) {
    registry.register::<Player, Coin>(collect_coin);
    registry.register::<Player, Gift>(collect_gift);
    registry.register::<Player, Enemy>(player_meets_enemy);
    registry.register::<Player, Spike>(player_meets_spike);
    registry.register::<Player, Goal>(player_reaches_goal);
    registry.register::<Projectile, Enemy>(projectile_hits_enemy);
    registry.register::<Projectile, Ground>(projectile_hits_solid);
    registry.register::<Projectile, Obstacle>(projectile_hits_solid);
}

fn collect_coin(player: &mut Entity, coin: &mut Entity, ctx: &mut CollisionContext<'_>) {
    let value = coin
        .get_component::<CollectibleComponent>()
        .map_or(ctx.config.scoring.coin_value, |c| c.value);
    coin.set_active(false);
    if let Some(score) = player.get_component_mut::<ScoreComponent>() {
        score.add_coin(value);
    }
    ctx.events.publish(CoinCollected {
        player: player.id(),
        coin: coin.id(),
        value,
    });
}

fn collect_gift(player: &mut Entity, gift: &mut Entity, ctx: &mut CollisionContext<'_>) {
    gift.set_active(false);
    let Some(effect) = gift.get_component::<GiftComponent>().map(|g| g.effect) else {
        return;
    };
    ctx.commands.change_player_state(player.id(), effect);
    ctx.events.publish(GiftCollected {
        player: player.id(),
        effect,
    });
}

fn player_meets_enemy(player: &mut Entity, enemy: &mut Entity, ctx: &mut CollisionContext<'_>) {
    let stomp = ctx.normal.y > STOMP_NORMAL_Y;
    let shielded = player
        .get_component::<HealthComponent>()
        .is_some_and(HealthComponent::is_invulnerable);

    if stomp || shielded {
        enemy.set_active(false);
        if let Some(score) = player.get_component_mut::<ScoreComponent>() {
            score.add_points(ctx.config.scoring.stomp_bonus);
        }
        if stomp {
            ctx.commands
                .apply_impulse(player.id(), Vec2::new(0.0, -ctx.config.scoring.stomp_bounce));
        }
        debug!(player = %player.id(), enemy = %enemy.id(), stomp, "enemy defeated");
        ctx.events.publish(EnemyDefeated {
            enemy: enemy.id(),
            by: player.id(),
        });
        return;
    }

    if hurt(player, ctx) {
        let away = if ctx.normal.x > 0.0 {
            -1.0
        } else if ctx.normal.x < 0.0 {
            1.0
        } else {
            0.0
        };
        let knockback = ctx.config.scoring.knockback;
        ctx.commands
            .apply_impulse(player.id(), Vec2::new(away * knockback, -0.5 * knockback));
    }
}

fn player_meets_spike(player: &mut Entity, _spike: &mut Entity, ctx: &mut CollisionContext<'_>) {
    if hurt(player, ctx) {
        let knockback = ctx.config.scoring.knockback;
        ctx.commands
            .apply_impulse(player.id(), Vec2::new(0.0, -knockback));
    }
}

/// Applies one contact hit. Returns `true` if it landed.
fn hurt(player: &mut Entity, ctx: &mut CollisionContext<'_>) -> bool {
    let grace = ctx.config.player.hit_grace;
    let Some(health) = player.get_component_mut::<HealthComponent>() else {
        return false;
    };
    if !health.take_hit(CONTACT_DAMAGE, grace) {
        return false;
    }
    let remaining = health.current();
    debug!(player = %player.id(), remaining, "player hurt");
    ctx.events.publish(PlayerDamaged {
        player: player.id(),
        remaining,
    });
    true
}

fn player_reaches_goal(player: &mut Entity, goal: &mut Entity, ctx: &mut CollisionContext<'_>) {
    let Some(marker) = goal.get_component_mut::<GoalComponent>() else {
        return;
    };
    if marker.reached {
        return;
    }
    marker.reached = true;
    ctx.events.publish(GoalReached {
        player: player.id(),
    });
}

fn projectile_hits_enemy(
    projectile: &mut Entity,
    enemy: &mut Entity,
    ctx: &mut CollisionContext<'_>,
) {
    let damage = projectile
        .get_component::<ProjectileComponent>()
        .map_or(ctx.config.player.projectile_damage, |p| p.damage);
    projectile.set_active(false);

    let remaining = enemy
        .get_component_mut::<HealthComponent>()
        .map_or(0, |health| health.damage(damage));
    if remaining > 0 {
        return;
    }

    enemy.set_active(false);
    ctx.events.publish(EnemyDefeated {
        enemy: enemy.id(),
        by: projectile.id(),
    });
    if let Some(transform) = enemy.get_component::<Transform>() {
        ctx.commands.spawn(SpawnRequest::Coin {
            position: transform.position,
            value: ctx.config.scoring.enemy_drop_value,
        });
    }
}

fn projectile_hits_solid(projectile: &mut Entity, _solid: &mut Entity, _ctx: &mut CollisionContext<'_>) {
    projectile.set_active(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandQueue};
    use crate::config::GameConfig;
    use crate::entity::{EntityKind, EntityManager};
    use crate::events::EventBus;
    use crate::player::PlayerStateKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        registry: CollisionRegistry,
        commands: CommandQueue,
        events: EventBus,
        config: GameConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                registry: CollisionRegistry::with_default_handlers(),
                commands: CommandQueue::new(),
                events: EventBus::new(),
                config: GameConfig::default(),
            }
        }

        fn hit(&mut self, a: &mut Entity, b: &mut Entity, normal: Vec2) {
            let mut ctx = CollisionContext::new(&mut self.commands, &mut self.events, &self.config);
            ctx.normal = normal;
            assert!(self.registry.dispatch(a, b, &mut ctx).is_handled());
        }
    }

    fn player() -> Entity {
        let mut e = Entity::new(EntityManager::generate_id(), EntityKind::Player);
        e.add_component(HealthComponent::new(3));
        e.add_component(ScoreComponent::default());
        e
    }

    fn enemy(health: u32) -> Entity {
        let mut e = Entity::new(EntityManager::generate_id(), EntityKind::Enemy);
        e.add_component(HealthComponent::new(health));
        e.add_component(Transform::new(Vec2::new(100.0, 50.0), Vec2::splat(32.0)));
        e
    }

    fn kind(kind: EntityKind) -> Entity {
        Entity::new(EntityManager::generate_id(), kind)
    }

    fn points(e: &Entity) -> u32 {
        e.get_component::<ScoreComponent>().map_or(0, |s| s.points)
    }

    fn health(e: &Entity) -> u32 {
        e.get_component::<HealthComponent>().map_or(0, HealthComponent::current)
    }

    #[test]
    fn coin_pickup_scores_and_deactivates() {
        let mut h = Harness::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        h.events.subscribe(move |e: &CoinCollected| sink.borrow_mut().push(e.value));

        let mut p = player();
        let mut coin = kind(EntityKind::Coin);
        coin.add_component(CollectibleComponent { value: 7 });
        h.hit(&mut coin, &mut p, Vec2::ZERO);

        assert!(!coin.is_active());
        assert_eq!(p.get_component::<ScoreComponent>(), Some(&ScoreComponent { points: 7, coins: 1 }));
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn coin_without_value_uses_configured_default() {
        let mut h = Harness::new();
        let (mut p, mut coin) = (player(), kind(EntityKind::Coin));
        h.hit(&mut p, &mut coin, Vec2::ZERO);
        assert_eq!(points(&p), h.config.scoring.coin_value);
    }

    #[test]
    fn gift_queues_state_change() {
        let mut h = Harness::new();
        let mut p = player();
        let mut gift = kind(EntityKind::Gift);
        gift.add_component(GiftComponent {
            effect: PlayerStateKind::Magnetic,
        });
        h.hit(&mut p, &mut gift, Vec2::ZERO);

        assert!(!gift.is_active());
        assert_eq!(
            h.commands.take(),
            vec![Command::ChangePlayerState {
                target: p.id(),
                state: PlayerStateKind::Magnetic
            }]
        );
    }

    #[test]
    fn stomp_defeats_enemy_and_bounces() {
        let mut h = Harness::new();
        let (mut p, mut e) = (player(), enemy(2));
        // Player above the enemy: the normal from player to enemy points down.
        h.hit(&mut p, &mut e, Vec2::new(0.0, 1.0));

        assert!(!e.is_active());
        assert_eq!(health(&p), 3);
        assert_eq!(points(&p), h.config.scoring.stomp_bonus);
        assert_eq!(
            h.commands.take(),
            vec![Command::ApplyImpulse {
                target: p.id(),
                impulse: Vec2::new(0.0, -h.config.scoring.stomp_bounce)
            }]
        );
    }

    #[test]
    fn stomp_is_recognised_when_enemy_reported_first() {
        let mut h = Harness::new();
        let (mut p, mut e) = (player(), enemy(2));
        // Normal from enemy to player points up.
        h.hit(&mut e, &mut p, Vec2::new(0.0, -1.0));
        assert!(!e.is_active());
    }

    #[test]
    fn side_contact_hurts_and_knocks_back() {
        let mut h = Harness::new();
        let (mut p, mut e) = (player(), enemy(2));
        h.hit(&mut p, &mut e, Vec2::new(1.0, 0.0));

        assert!(e.is_active());
        assert_eq!(health(&p), 2);
        let knockback = h.config.scoring.knockback;
        assert_eq!(
            h.commands.take(),
            vec![Command::ApplyImpulse {
                target: p.id(),
                impulse: Vec2::new(-knockback, -0.5 * knockback)
            }]
        );

        // Second touch inside the grace period does nothing.
        h.hit(&mut p, &mut e, Vec2::new(1.0, 0.0));
        assert_eq!(health(&p), 2);
        assert!(h.commands.is_empty());
    }

    #[test]
    fn shield_defeats_enemy_on_side_contact() {
        let mut h = Harness::new();
        let (mut p, mut e) = (player(), enemy(2));
        if let Some(health) = p.get_component_mut::<HealthComponent>() {
            health.set_invulnerable(true);
        }
        h.hit(&mut p, &mut e, Vec2::new(-1.0, 0.0));

        assert!(!e.is_active());
        assert_eq!(health(&p), 3);
        assert!(h.commands.is_empty());
    }

    #[test]
    fn spike_hurts_unless_shielded() {
        let mut h = Harness::new();
        let (mut p, mut spike) = (player(), kind(EntityKind::Spike));
        h.hit(&mut spike, &mut p, Vec2::ZERO);
        assert_eq!(health(&p), 2);

        let mut shielded = player();
        if let Some(health) = shielded.get_component_mut::<HealthComponent>() {
            health.set_invulnerable(true);
        }
        h.hit(&mut shielded, &mut spike, Vec2::ZERO);
        assert_eq!(health(&shielded), 3);
    }

    #[test]
    fn goal_reached_once() {
        let mut h = Harness::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        h.events.subscribe(move |_: &GoalReached| *sink.borrow_mut() += 1);

        let mut p = player();
        let mut goal = kind(EntityKind::Goal);
        goal.add_component(GoalComponent::default());
        h.hit(&mut p, &mut goal, Vec2::ZERO);
        h.hit(&mut goal, &mut p, Vec2::ZERO);

        assert_eq!(*count.borrow(), 1);
        assert!(goal.get_component::<GoalComponent>().is_some_and(|g| g.reached));
        assert!(goal.is_active());
    }

    #[test]
    fn projectile_damages_then_defeats_enemy() {
        let mut h = Harness::new();
        let mut e = enemy(2);

        let mut first = kind(EntityKind::Projectile);
        first.add_component(ProjectileComponent::new(1.0, 1));
        h.hit(&mut first, &mut e, Vec2::ZERO);
        assert!(!first.is_active());
        assert!(e.is_active());
        assert_eq!(health(&e), 1);
        assert!(h.commands.is_empty());

        let mut second = kind(EntityKind::Projectile);
        second.add_component(ProjectileComponent::new(1.0, 1));
        h.hit(&mut e, &mut second, Vec2::ZERO);
        assert!(!e.is_active());
        assert_eq!(
            h.commands.take(),
            vec![Command::Spawn(SpawnRequest::Coin {
                position: Vec2::new(100.0, 50.0),
                value: h.config.scoring.enemy_drop_value
            })]
        );
    }

    #[test]
    fn projectile_stops_at_solids() {
        let mut h = Harness::new();
        for solid in [EntityKind::Ground, EntityKind::Obstacle] {
            let mut projectile = kind(EntityKind::Projectile);
            let mut wall = kind(solid);
            h.hit(&mut wall, &mut projectile, Vec2::ZERO);
            assert!(!projectile.is_active());
            assert!(wall.is_active());
        }
    }

    #[test]
    fn unrelated_pairs_stay_unhandled() {
        let h = Harness::new();
        assert!(!h.registry.handles(EntityKind::Coin, EntityKind::Enemy));
        assert!(!h.registry.handles(EntityKind::Player, EntityKind::Ground));
    }
}
