use crate::config::SimConfig;
use crate::helpers::{Aabb, Bounds, Facing};
use crate::hero::{HeroLink, WeaponPhase};
use crate::pool::SpritePool;
use crate::registry::Registry;
use crate::sprite::{Collision, Layer, Sprite};

/// One detection pass over every active, non-background sprite.
///
/// Flags are only ever set here; each sprite clears or acknowledges its own.
pub fn detect(pool: &mut SpritePool, projectiles: &Registry, hero: &mut dyn HeroLink) {
    let state = hero.state();
    let hero_body = state.body_box();
    let bat = state.weapon_box();
    let striking = state.weapon == WeaponPhase::Striking;

    let missiles: Vec<(Aabb, Facing)> = projectiles
        .iter()
        .filter_map(|handle| pool.get(handle))
        .map(|p| (p.weapon_box(), p.facing))
        .collect();

    let handles: Vec<_> = pool.handles().collect();
    for handle in handles {
        let Some(sprite) = pool.get_mut(handle) else {
            continue;
        };
        if sprite.layer == Layer::Background {
            continue;
        }

        if sprite.collision == Collision::None {
            let body = sprite.body_box();
            if striking && bat.overlaps(&body) {
                sprite.collision = Collision::HitByWeapon;
                sprite.collision_dir = state.facing;
            } else if let Some((_, dir)) = missiles.iter().find(|(wb, _)| wb.overlaps(&body)) {
                sprite.collision = Collision::HitByProjectile;
                sprite.collision_dir = *dir;
            }
        }

        if sprite.weapon_active && sprite.weapon_box().overlaps(&hero_body) {
            if sprite.damage != 0 {
                hero.notify_hit(sprite.damage, sprite.facing);
            }
            sprite.hit_hero = true;
        }
    }
}

/// Hero geometry handed to [`resolve_hero`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroBlockQuery {
    pub x: f32,
    pub y: i32,
    pub width: i32,
    pub body: Bounds,
    /// Scroll the hero is asking for this frame.
    pub scroll: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroBlockResult {
    pub x: f32,
    pub scroll: f32,
    /// Top of the solid the hero stands on, if any.
    pub ground: Option<i32>,
}

/// Stops the hero against blockers and lands it on top of them.
///
/// A blocker the hero does not overlap yet is tested again as it will sit
/// after this frame's scroll, so the world stops scrolling into it.
pub fn resolve_hero(
    pool: &SpritePool,
    blockers: &Registry,
    query: HeroBlockQuery,
    config: &SimConfig,
) -> HeroBlockResult {
    let mut out = HeroBlockResult {
        x: query.x,
        scroll: query.scroll,
        ground: None,
    };
    if blockers.is_empty() {
        return out;
    }

    let hero = query.body.at(query.x as i32, query.y);
    let h_min = query.x as i32;
    let h_max = h_min + query.width;
    let h_mid = h_min + (h_max - h_min) / 2;

    for handle in blockers.iter() {
        let Some(solid) = pool.get(handle) else {
            continue;
        };
        let mut s = solid.body_box();
        let s_mid = s.mid_x();

        let above = hero.max_y <= s.min_y;
        if above {
            // narrower ledge so the hero can't stand on the shelf's edge art
            s.min_x += 25;
            s.max_x -= 25;
        }

        if !(s.min_x > h_max || s.max_x < h_min) {
            if above {
                out.ground = Some(s.min_y - query.body.bottom);
            } else {
                out.scroll = 0.0;
                if h_mid <= s_mid {
                    out.x = (s.min_x - query.width) as f32;
                } else {
                    out.x = (s.max_x + 2) as f32;
                    let midpoint = config.hero_midpoint_east as f32;
                    if out.x > midpoint {
                        out.scroll = out.x - midpoint;
                        out.x = midpoint;
                    }
                }
            }
        } else if out.scroll as i32 != 0 {
            let min_x = (s.min_x as f32 - out.scroll) as i32;
            let max_x = (s.max_x as f32 - out.scroll) as i32;
            let mid = min_x + (max_x - min_x) / 2;
            if !(min_x > h_max || max_x < h_min) {
                if above {
                    out.ground = Some(s.min_y - query.body.bottom);
                } else if h_mid <= mid {
                    out.scroll = (solid.x + solid.body.left as f32) - h_max as f32;
                } else {
                    out.scroll = -(h_min as f32 - (solid.x + solid.body.right as f32 - 5.0));
                }
            }
        }
    }
    out
}

/// Lands a sprite on a blocker or bounces it off the blocker's side.
///
/// Only the first blocker the sprite overlaps on x is considered.
pub fn resolve_sprite(sprite: &mut Sprite, pool: &SpritePool, blockers: &Registry, config: &SimConfig) {
    if blockers.is_empty() {
        return;
    }
    let me = sprite.body_box();
    let my_mid = me.mid_x();
    for handle in blockers.iter() {
        let Some(solid) = pool.get(handle) else {
            continue;
        };
        let other = solid.body_box();
        if other.overlaps_x(&me) {
            if me.max_y <= other.min_y {
                sprite.ground = other.min_y - sprite.h;
            } else {
                sprite.vel_x = -sprite.vel_x;
                sprite.facing = Facing::from_velocity(sprite.vel_x);
                sprite.ground = config.floor_for(sprite.h);
                sprite.x = if my_mid <= other.mid_x() {
                    solid.x - sprite.w as f32 - 1.0
                } else {
                    solid.x + solid.w as f32 + 1.0
                };
            }
            break;
        }
        sprite.ground = config.floor_for(sprite.h);
    }
}
