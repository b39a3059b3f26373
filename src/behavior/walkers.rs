//! Ground-bound opponents: employees, archers and their arrows, bicycles.

use super::{
    Behavior, InitCtx, SpawnParams, SpawnRequest, SpriteKind, Step, UpdateCtx, block, drift, from_sheet, knockback,
};
use crate::helpers::{Bounds, Facing};
use crate::resources::{ImageId, SoundCue};
use crate::sprite::{Collision, Delay, Layer, Sprite};

pub fn init_employee(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let s = from_sheet(ctx, request, ImageId::EMPLOYEE, 10)?;
    let mut s = s.with_order(&[0, 1, 2, 3, 8], &[4, 5, 6, 7, 9]);
    s.behavior = Behavior::Employee;
    s.x = 478.0;
    s.y = s.ground;
    s.delay_y = Delay::new(2);
    s.delay_frame = Delay::new(6);
    s.weapon_active = true;
    s.moving = true;
    s.vel_x = -4.5;
    s.vel_y = -15;
    s.gravity = 2;
    s.facing = Facing::West;
    s.frame_count = 4;
    s.body = Bounds::new(15, 0, s.w - 15, s.h);
    s.weapon = Bounds::new(15, 5, s.w - 15, s.h - 5);
    s.frame = s.frame_at(0);
    Some(s)
}

/// Walks west, turns around well off either edge, flies backwards when hit.
pub fn update_employee(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    if s.collision != Collision::None {
        let step = knockback(s, ctx, SoundCue::EmployeeHit);
        s.frame = s.frame_at(s.frame_count);
        return step;
    }

    drift(s, ctx.scroll);
    if s.moving && s.delay_frame.tick() {
        s.frame_index = (s.frame_index + 1) % s.frame_count.max(1);
    }
    s.frame = s.frame_at(s.frame_index);
    if s.moving && s.delay_x.tick() {
        s.x += s.vel_x;
    }
    block(s, ctx);

    if s.x < -200.0 {
        s.x = ctx.random(-199, -50) as f32;
        s.vel_x = -s.vel_x;
        s.facing = Facing::East;
    }
    if s.x as i32 > ctx.config.screen_width + 200 {
        s.x = (ctx.config.screen_width + ctx.random(50, 199)) as f32;
        s.vel_x = -s.vel_x;
        s.facing = Facing::West;
    }
    Step::Continue
}

pub fn init_archer(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let east: Vec<u8> = (0..12).collect();
    let west: Vec<u8> = (12..24).collect();
    let s = from_sheet(ctx, request, request.image, 24)?;
    let mut s = s.with_order(&east, &west);
    s.behavior = Behavior::Archer;
    s.y = s.ground;
    s.delay_y = Delay::new(2);
    s.delay_frame = Delay::new(3);
    s.facing = Facing::West;
    s.weapon_active = true;
    s.vel_x = -1.0;
    s.vel_y = -15;
    s.gravity = 2;
    s.frame_count = 11;
    s.weapon = Bounds::new(25, 20, s.w - 25, s.h - 10);
    s.body = Bounds::new(30, 10, s.w - 30, s.h - 10);
    s.frame = s.frame_at(0);
    Some(s)
}

/// Stands its ground facing the hero and looses an arrow once per cycle.
pub fn update_archer(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    if s.collision != Collision::None {
        if knockback(s, ctx, SoundCue::EmployeeHit) == Step::Destroy {
            return Step::Destroy;
        }
        s.frame = s.frame_at(s.frame_count);
        s.delay_frame.limit = 3;
    } else {
        drift(s, ctx.scroll);

        // the sheet is drawn off-centre, so turning also shifts the sprite
        if s.facing != Facing::East && ctx.hero.x > s.x + 40.0 {
            s.facing = Facing::East;
            s.vel_x = 1.0;
            s.x += 40.0;
        }
        if s.facing != Facing::West && ctx.hero.x < s.x - 40.0 {
            s.facing = Facing::West;
            s.vel_x = -1.0;
            s.x -= 40.0;
        }

        if s.delay_frame.tick_past() {
            s.frame_index += 1;
            if s.frame_index >= s.frame_count {
                s.frame_index = 0;
            }
            if s.frame_index == 8 {
                ctx.play(SoundCue::Arrow);
                let offset = if s.facing == Facing::East { 80.0 } else { -14.0 };
                ctx.spawn(
                    SpawnRequest::new(
                        SpriteKind::Arrow,
                        ImageId::ARROW,
                        s.x + offset,
                        s.y + 46,
                        s.z + 0.5,
                        Layer::Active,
                    )
                    .with_params(SpawnParams::Facing(s.facing)),
                );
            }
            // hold the drawn pose before the next shot
            s.delay_frame.limit = if s.frame_index == 0 { 10 } else { 3 };
        }
        s.frame = s.frame_at(s.frame_index);
    }

    block(s, ctx);
    if s.off_west() { Step::Destroy } else { Step::Continue }
}

pub fn init_arrow(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 2)?;
    s.behavior = Behavior::Arrow;
    s.facing = request.facing_or(Facing::West);
    s.weapon_active = true;
    s.moving = true;
    s.collision = Collision::Acknowledged;
    if s.facing == Facing::East {
        s.frame = 0;
        s.vel_x = 7.0;
        s.weapon = Bounds::new(s.w - 15, 0, s.w, s.h);
    } else {
        s.frame = 1;
        s.vel_x = -5.0;
        s.weapon = Bounds::new(0, 0, 15, s.h);
    }
    Some(s)
}

/// Flies straight; bursts into an explosion on the hero.
pub fn update_arrow(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    s.x += s.vel_x;

    if s.off_west() || s.off_east(ctx.config) {
        return Step::Destroy;
    }
    // with no room for the explosion the arrow keeps flying
    if s.hit_hero && ctx.pool.has_free_slot() {
        let mut offset = -25.0;
        if s.facing == Facing::East {
            offset += s.w as f32;
        }
        ctx.spawn(SpawnRequest::new(
            SpriteKind::Explosion,
            ImageId::BOMB,
            s.x + offset,
            s.y - 25,
            11.0,
            Layer::Background,
        ));
        return Step::Destroy;
    }
    Step::Continue
}

pub fn init_bicycle(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let image = if request.image == ImageId::ANY_BICYCLE {
        // plain bicycles are the rarer pick
        if ctx.random(0, 2) == 1 { ImageId::BICYCLE } else { ImageId::BICYCLE_WHEELIE }
    } else {
        request.image
    };
    let facing = match request.params {
        SpawnParams::Facing(dir) => dir.east_or_west(),
        _ if ctx.random(0, 3) == 1 => Facing::East,
        _ => Facing::West,
    };

    let s = from_sheet(ctx, request, image, 4)?;
    let mut s = s.with_order(&[0, 1], &[2, 3]);
    s.facing = facing;
    if request.y == 0 {
        s.y = s.ground;
    }
    s.delay_frame = Delay::new(4);
    if facing == Facing::East {
        s.x = (3 - s.w) as f32;
        s.vel_x = 6.5;
    } else {
        s.x = 478.0;
        s.vel_x = -5.0;
    }
    s.delay_y = Delay::new(2);
    s.vel_y = -15;
    s.gravity = 2;
    s.weapon_active = true;
    s.moving = true;
    s.frame_count = 2;
    s.weapon = Bounds::new(10, 15, s.w - 10, s.h - 10);
    s.body = Bounds::new(10, 10, s.w - 10, s.h - 10);

    if request.layer == Layer::Background {
        s.x = request.x;
        s.frame = s.frame_at(0);
        s.behavior = Behavior::Scenery { nudge: true };
    } else {
        s.behavior = Behavior::Bicycle { bell: 0 };
    }
    Some(s)
}

/// Rides across the screen, ringing its bell once.
pub fn update_bicycle(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    if s.collision == Collision::HitByProjectile {
        s.collision = Collision::None;
    }
    if s.collision != Collision::None {
        let step = knockback(s, ctx, SoundCue::Bicycle);
        s.frame = s.frame_at(s.frame_count - 1);
        return step;
    }

    drift(s, ctx.scroll);
    if let Behavior::Bicycle { bell } = &mut s.behavior {
        if *bell == 20 {
            ctx.sounds.push(SoundCue::BicycleBell);
        }
        *bell = bell.saturating_add(1);
    }
    if s.moving {
        if s.delay_frame.tick() {
            s.frame_index = (s.frame_index + 1) % s.frame_count.max(1);
        }
        s.x += s.vel_x;
    }
    s.frame = s.frame_at(s.frame_index);
    block(s, ctx);

    if s.off_west() || s.off_east(ctx.config) { Step::Destroy } else { Step::Continue }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Bench;
    use super::*;

    #[test]
    fn employee_enters_from_the_east_edge() {
        let mut bench = Bench::new();
        let s = bench.make(SpriteKind::Employee, ImageId::EMPLOYEE, 10.0, 0, Layer::Active);
        assert_eq!(s.x, 478.0);
        assert_eq!(s.h, 96);
        assert_eq!(s.y, 272 - 96 - 10);
        assert_eq!(s.facing, Facing::West);
        assert_eq!(s.frame, 4);
    }

    #[test]
    fn employee_walks_and_animates() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Employee, ImageId::EMPLOYEE, 0.0, 0, Layer::Active);
        assert_eq!(bench.run(&mut s, 7), Step::Continue);
        assert_eq!(s.x, 478.0 - 7.0 * 4.5);
        assert_eq!(s.frame_index, 1);
        assert_eq!(s.frame, 5);
    }

    #[test]
    fn employee_wraps_back_in_from_the_west() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Employee, ImageId::EMPLOYEE, 0.0, 0, Layer::Active);
        s.x = -198.0;
        bench.run(&mut s, 1);
        assert!((-199.0..=-50.0).contains(&s.x));
        assert_eq!(s.vel_x, 4.5);
        assert_eq!(s.facing, Facing::East);
    }

    #[test]
    fn scrolling_moves_the_employee_with_the_world() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Employee, ImageId::EMPLOYEE, 0.0, 0, Layer::Active);
        bench.scroll = 3.0;
        bench.run(&mut s, 1);
        assert_eq!(s.x, 478.0 - 3.0 - 4.5);
    }

    #[test]
    fn archer_turns_to_face_the_hero_and_shoots() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Archer, ImageId::ARCHER, 100.0, 0, Layer::Active);
        bench.hero.x = 300.0;
        bench.run(&mut s, 1);
        assert_eq!(s.facing, Facing::East);
        assert_eq!(s.x, 140.0);

        bench.run(&mut s, 60);
        let arrow = bench.spawns.iter().find(|r| r.kind == SpriteKind::Arrow).expect("arrow queued");
        assert_eq!(arrow.x, 220.0);
        assert_eq!(arrow.params, SpawnParams::Facing(Facing::East));
        assert!(bench.sounds.contains(&SoundCue::Arrow));
    }

    #[test]
    fn arrow_heading_sets_speed_and_tip() {
        let mut bench = Bench::new();
        let east = bench.make_with(
            SpawnRequest::new(SpriteKind::Arrow, ImageId::ARROW, 50.0, 100, 5.0, Layer::Active)
                .with_params(SpawnParams::Facing(Facing::East)),
        );
        assert_eq!((east.vel_x, east.frame), (7.0, 0));
        assert_eq!(east.weapon, Bounds::new(25, 0, 40, 8));

        let west = bench.make(SpriteKind::Arrow, ImageId::ARROW, 50.0, 100, Layer::Active);
        assert_eq!((west.vel_x, west.frame), (-5.0, 1));
        assert_eq!(west.weapon, Bounds::new(0, 0, 15, 8));
    }

    #[test]
    fn arrow_explodes_on_the_hero() {
        let mut bench = Bench::new();
        let mut arrow = bench.make(SpriteKind::Arrow, ImageId::ARROW, 200.0, 100, Layer::Active);
        arrow.hit_hero = true;
        assert_eq!(bench.run(&mut arrow, 1), Step::Destroy);
        let boom = bench.spawns.last().expect("explosion queued");
        assert_eq!(boom.kind, SpriteKind::Explosion);
        assert_eq!(boom.layer, Layer::Background);
        assert_eq!((boom.x, boom.y), (195.0 - 25.0, 75));
    }

    #[test]
    fn arrow_leaving_the_screen_is_destroyed() {
        let mut bench = Bench::new();
        let mut arrow = bench.make(SpriteKind::Arrow, ImageId::ARROW, -36.0, 100, Layer::Active);
        assert_eq!(bench.run(&mut arrow, 1), Step::Destroy);
        assert!(bench.spawns.is_empty());
    }

    #[test]
    fn bicycle_rings_once_and_crosses() {
        let mut bench = Bench::new();
        let mut bike = bench.make_with(
            SpawnRequest::new(SpriteKind::Bicycle, ImageId::ANY_BICYCLE, 0.0, 0, 5.0, Layer::Active)
                .with_params(SpawnParams::Facing(Facing::East)),
        );
        assert!(bike.image == ImageId::BICYCLE || bike.image == ImageId::BICYCLE_WHEELIE);
        assert_eq!(bike.x, (3 - 90) as f32);
        assert_eq!(bench.run(&mut bike, 200), Step::Destroy);
        let bells = bench.sounds.iter().filter(|c| **c == SoundCue::BicycleBell).count();
        assert_eq!(bells, 1);
    }

    #[test]
    fn bicycle_shrugs_off_projectiles() {
        let mut bench = Bench::new();
        let mut bike = bench.make(SpriteKind::Bicycle, ImageId::BICYCLE, 0.0, 0, Layer::Active);
        bike.collision = Collision::HitByProjectile;
        bench.run(&mut bike, 1);
        assert_eq!(bike.collision, Collision::None);
        assert!(!bike.jumping);
    }

    #[test]
    fn background_bicycle_is_parked_scenery() {
        let mut bench = Bench::new();
        let bike = bench.make(SpriteKind::Bicycle, ImageId::BICYCLE, 120.0, 40, Layer::Background);
        assert_eq!(bike.x, 120.0);
        assert_eq!(bike.y, 40);
        assert!(matches!(bike.behavior, Behavior::Scenery { .. }));
    }
}
