use super::{Behavior, InitCtx, SpawnRequest, Step, UpdateCtx, block, bounce, drift, from_sheet, launch};
use crate::helpers::{Bounds, Facing};
use crate::resources::{ImageId, SoundCue};
use crate::sprite::{Collision, Delay, Layer, Sprite};

/// How close the hero has to come before a shelf hazard is set off.
const TRIGGER_RANGE: f32 = 125.0;

fn hero_in_range(s: &Sprite, ctx: &UpdateCtx) -> bool {
    s.x - ctx.hero.x < TRIGGER_RANGE
}

pub fn init_bowling_ball(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let s = from_sheet(ctx, request, request.image, 7)?;
    let mut s = s.with_order(&[0, 1, 2, 3, 3, 4, 4, 5, 5, 6, 6, 6, 6, 6], &[]);
    s.delay_y = Delay::new(2);
    s.delay_frame = Delay::new(2);
    s.vel_y = 12;
    s.gravity = 2;
    s.frame_count = 14;
    s.collision = Collision::Acknowledged;
    s.body = Bounds::new(0, 0, s.w, s.h);
    s.weapon = Bounds::new(5, 5, s.w - 5, s.h - 5);
    if request.layer == Layer::Background {
        s.facing = Facing::East;
        s.behavior = Behavior::Scenery { nudge: true };
    } else {
        s.behavior = Behavior::BowlingBall;
    }
    Some(s)
}

/// Rolls off its shelf once the hero is near, drops to the floor and lies there.
pub fn update_bowling_ball(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if hero_in_range(s, ctx) {
        s.moving = true;
    }

    if s.moving && s.delay_frame.tick() && s.frame_index < s.frame_count - 1 {
        s.frame_index += 1;
        match s.frame_index {
            1 | 2 => s.y -= 1,
            3..=10 => {
                s.weapon_active = true;
                s.y += s.vel_y;
                s.vel_y += 2;
            }
            11 => {
                s.weapon_active = false;
                s.y -= 5;
                ctx.play(SoundCue::BowlingBallFall);
            }
            12 => {
                s.y += 3;
                s.weapon_active = false;
            }
            _ => {}
        }
    }

    s.frame = i32::from(s.frame_order[0][s.frame_index as usize]);
    if s.off_west() { Step::Destroy } else { Step::Continue }
}

pub fn init_bouncing_ball(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let frames = match request.image {
        ImageId::BASKETBALL | ImageId::SOCCERBALL => 10,
        ImageId::BASEBALL => 5,
        other => {
            log::warn!("image {} is not a ball", other.0);
            return None;
        }
    };
    let mut s = from_sheet(ctx, request, request.image, frames)?;
    s.behavior = Behavior::BouncingBall;
    launch(&mut s, ctx);
    s.y = s.ground;
    s.delay_y = Delay::new(2);
    s.delay_frame = Delay::new(3);
    s.weapon_active = true;
    s.moving = true;
    s.jumping = true;
    s.frame_count = i32::from(frames);
    s.body = Bounds::new(5, 5, s.w - 5, s.h - 5);
    s.weapon = s.body;
    Some(s)
}

/// Bounces across the screen. A bat hit turns the ball into a projectile
/// that flies low and fast, and which the hero can no longer be hurt by.
pub fn update_bouncing_ball(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    match s.collision {
        Collision::HitByWeapon => {
            ctx.play(SoundCue::BallHit);
            ctx.registries.projectiles.add(ctx.handle);
            s.layer = Layer::Background;
            s.collision = Collision::Acknowledged;
            s.vel_x = if s.vel_x > 0.0 { 10.0 } else { -10.0 };
            if ctx.hero.facing != s.facing {
                s.vel_x = -s.vel_x;
                s.facing = s.facing.reversed();
            }
            s.gravity = 0;
            s.vel_y = -10;
            s.vel_y_cur = if s.vel_y_cur < 0 { -10 } else { 10 };
        }
        Collision::HitByProjectile => s.collision = Collision::None,
        _ => {}
    }

    drift(s, ctx.scroll);
    if s.moving && s.delay_x.tick() {
        s.x += s.vel_x;
    }
    if s.delay_frame.tick() {
        s.frame_index += if s.vel_x <= 0.0 { 1 } else { -1 };
        let frames = i32::from(s.frames);
        if s.frame_index >= frames {
            s.frame_index = 0;
        }
        if s.frame_index < 0 {
            s.frame_index = frames - 1;
        }
    }
    bounce(s);
    block(s, ctx);
    s.frame = s.frame_index;

    if s.off_west() || s.off_east(ctx.config) {
        if s.layer == Layer::Background {
            ctx.registries.projectiles.remove(ctx.handle);
        }
        return Step::Destroy;
    }
    Step::Continue
}

pub fn init_bouncing_bomb(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    // the bouncing bomb borrows the rolling bomb's sheet
    let mut s = from_sheet(ctx, request, ImageId::BOMB, 16)?;
    s.behavior = Behavior::BouncingBomb;
    launch(&mut s, ctx);
    s.y = s.ground;
    s.delay_y = Delay::new(2);
    s.delay_frame = Delay::new(3);
    s.weapon_active = true;
    s.moving = true;
    s.jumping = true;
    s.frame_count = 8;
    s.body = Bounds::new(12, 15, s.w - 12, s.h - 15);
    s.weapon = s.body;
    Some(s)
}

/// Bounces like a ball until it is struck or touches the hero, then
/// plays its explosion frames in place.
pub fn update_bouncing_bomb(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if s.collision == Collision::HitByProjectile {
        s.collision = Collision::None;
    }
    if s.collision == Collision::HitByWeapon || (s.hit_hero && s.collision == Collision::None) {
        ctx.play(SoundCue::Explosion);
        s.collision = Collision::Acknowledged;
        s.frame_index = 8;
        s.delay_frame.current = 0;
        s.frame_count = 16;
        s.weapon_active = false;
        s.moving = false;
    }

    if s.moving && s.delay_x.tick() {
        s.x += s.vel_x;
    }

    if s.collision == Collision::None {
        if s.delay_frame.tick() {
            s.frame_index += if s.vel_x <= 0.0 { 1 } else { -1 };
            if s.frame_index >= s.frame_count {
                s.frame_index = 0;
            }
            if s.frame_index < 0 {
                s.frame_index = s.frame_count - 1;
            }
        }
        bounce(s);
        block(s, ctx);
    } else if s.delay_frame.tick() {
        s.frame_index += 1;
    }

    s.frame = s.frame_index;
    if s.frame_index >= s.frame_count || s.off_west() || s.off_east(ctx.config) {
        Step::Destroy
    } else {
        Step::Continue
    }
}

pub fn init_bomb(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 16)?;
    s.behavior = Behavior::Bomb;
    s.x = 479.0;
    s.y = ctx.config.screen_height - s.h;
    s.delay_frame = Delay::new(3);
    // a bomb has no heading, so it does not throw the hero either way
    s.facing = Facing::Still;
    s.weapon_active = true;
    s.moving = true;
    s.vel_x = -3.0;
    s.frame_count = 16;
    s.collision = Collision::Acknowledged;
    s.body = Bounds::new(11, 15, s.w - 11, s.h - 15);
    s.weapon = Bounds::new(20, 15, s.w - 20, s.h - 15);
    Some(s)
}

/// Rolls in from the east edge and explodes on the hero or on bouncing
/// off a blocker.
pub fn update_bomb(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    s.x += s.vel_x;

    // a blocker bounce is the only thing that turns a bomb east
    if s.weapon_active && (s.hit_hero || s.facing == Facing::East) {
        s.vel_x = 0.0;
        s.moving = false;
        s.frame_index = 8;
        s.weapon_active = false;
        ctx.play(SoundCue::Explosion);
    }

    if s.moving {
        if s.delay_frame.tick() {
            s.frame_index += 1;
            if s.frame_index >= 8 {
                s.frame_index = 0;
            }
        }
    } else {
        if s.delay_frame.tick() {
            s.frame_index += 1;
        }
        if s.frame_index >= s.frame_count - 2 {
            s.weapon_active = false;
        }
    }

    block(s, ctx);
    s.frame = s.frame_index;
    if s.off_west() || s.frame_index >= s.frame_count { Step::Destroy } else { Step::Continue }
}

pub fn init_explosion(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 16)?;
    s.behavior = Behavior::Explosion { sounded: false };
    s.delay_frame = Delay::new(3);
    s.frame_index = 8;
    s.frame_count = 16;
    s.frame = 8;
    s.collision = Collision::Acknowledged;
    Some(s)
}

pub fn update_explosion(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if let Behavior::Explosion { sounded } = &mut s.behavior {
        if !*sounded {
            *sounded = true;
            ctx.sounds.push(SoundCue::Explosion);
        }
    }
    if s.delay_frame.tick_past() {
        s.frame_index += 1;
        if s.frame_index >= s.frame_count {
            return Step::Destroy;
        }
        s.frame = s.frame_index;
    }
    Step::Continue
}

pub fn init_grill(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, ImageId::GRILL, 10)?;
    s.delay_frame = Delay::new(3);
    s.frame_count = 10;
    s.collision = Collision::Acknowledged;
    s.body = Bounds::new(5, 5, s.w - 5, s.h - 5);
    s.weapon = Bounds::new(15, 55, s.w - 15, s.h - 50);
    s.behavior = if request.layer == Layer::Background {
        Behavior::Scenery { nudge: true }
    } else {
        Behavior::Grill
    };
    Some(s)
}

/// Tips over when the hero approaches and keeps flaring its last frames.
pub fn update_grill(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if hero_in_range(s, ctx) {
        s.moving = true;
    }
    if s.moving && s.delay_frame.tick() {
        s.frame_index += 1;
        if s.frame_index >= 8 {
            s.weapon_active = true;
        }
        if s.frame_index == 4 {
            ctx.play(SoundCue::GrillFalling);
        }
        if s.frame_index > s.frame_count - 1 {
            s.frame_index = 8;
        }
    }
    s.frame = s.frame_index;
    if s.off_west() { Step::Destroy } else { Step::Continue }
}

pub fn init_punching_bag(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 11)?;
    s.delay_frame = Delay::new(2);
    s.frame_count = 11;
    s.collision = Collision::Acknowledged;
    s.weapon = Bounds::new(9, 50, 41, 100);
    if request.layer == Layer::Background {
        s.frame = 5;
        s.behavior = Behavior::Scenery { nudge: true };
    } else {
        s.behavior = Behavior::PunchingBag { step: 1 };
    }
    Some(s)
}

/// Swings back and forth; only the far end of the swing hurts.
pub fn update_punching_bag(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if s.delay_frame.tick() {
        if let Behavior::PunchingBag { step } = &mut s.behavior {
            s.frame_index += *step;
            if s.frame_index >= i32::from(s.frames) - 1 || s.frame_index <= 0 {
                *step = -*step;
            }
        }
        s.weapon_active = s.frame_index >= 7;
    }
    s.frame = s.frame_index;
    if s.off_west() { Step::Destroy } else { Step::Continue }
}
