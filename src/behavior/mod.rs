//! Sprite kinds, their spawn-time setup and their per-frame state machines.
//!
//! Every kind is a pair: an init function that builds a [`Sprite`] from a
//! [`SpawnRequest`], and an update function that advances it one frame. All
//! updates share the signature `fn(&mut Sprite, &mut UpdateCtx) -> Step` and
//! are dispatched through [`update`].

use rand::rngs::StdRng;

use crate::collision::resolve_sprite;
use crate::config::SimConfig;
use crate::helpers::{Facing, random_range};
use crate::hero::HeroState;
use crate::pool::{SpriteHandle, SpritePool};
use crate::registry::Registries;
use crate::resources::{ImageId, ImageLibrary, SoundCue};
use crate::sprite::{Collision, Layer, Sprite};

pub mod ambush;
pub mod hazards;
pub mod scenery;
pub mod walkers;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Scenery,
    Employee,
    BowlingShelf,
    BowlingBall,
    BouncingBall,
    BouncingBomb,
    Grill,
    Tent,
    TentGuy,
    PunchingBag,
    RandomShelf,
    FallingShelf,
    PowerUp,
    Twinkle,
    Bomb,
    Series,
    Archer,
    Arrow,
    Explosion,
    Bicycle,
    ScreenshotText,
    LevelCompleteText,
}

impl SpriteKind {
    /// Kind the level layer gets for an image id. Unknown ids become plain
    /// scenery on the background layer and are refused on the active layer.
    pub fn from_id(id: ImageId, layer: Layer) -> Option<Self> {
        let kind = match id.0 {
            5 => Self::Employee,
            41 => Self::BowlingShelf,
            42..=45 => Self::BowlingBall,
            6..=8 => Self::BouncingBall,
            9 => Self::Grill,
            50..=55 => Self::Tent,
            11 => Self::PunchingBag,
            12 => Self::RandomShelf,
            16 => Self::FallingShelf,
            18 | 64 => Self::PowerUp,
            4 => Self::Bomb,
            101 => Self::Series,
            56 => Self::Archer,
            57 => Self::Arrow,
            58 => Self::BouncingBomb,
            60 | 61 | 100 => Self::Bicycle,
            _ if layer == Layer::Background => Self::Scenery,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SpawnParams {
    #[default]
    None,
    /// Heading for tents, tent guys, arrows and bicycles.
    Facing(Facing),
    /// Series spawner: emit `count` sprites of `id`, one every `interval + 1` frames.
    Series { id: ImageId, count: i32, interval: u16 },
    /// Row of a stacked shelf-layer sheet.
    ShelfRow(i32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub kind: SpriteKind,
    pub image: ImageId,
    pub x: f32,
    pub y: i32,
    pub z: f32,
    pub layer: Layer,
    pub params: SpawnParams,
}

impl SpawnRequest {
    pub fn new(kind: SpriteKind, image: ImageId, x: f32, y: i32, z: f32, layer: Layer) -> Self {
        Self {
            kind,
            image,
            x,
            y,
            z,
            layer,
            params: SpawnParams::None,
        }
    }

    pub fn from_id(id: ImageId, x: f32, y: i32, z: f32, layer: Layer, params: SpawnParams) -> Option<Self> {
        let kind = SpriteKind::from_id(id, layer)?;
        Some(Self::new(kind, id, x, y, z, layer).with_params(params))
    }

    pub fn with_params(mut self, params: SpawnParams) -> Self {
        self.params = params;
        self
    }

    fn facing_or(&self, fallback: Facing) -> Facing {
        match self.params {
            SpawnParams::Facing(dir) => dir.east_or_west(),
            _ => fallback,
        }
    }
}

pub struct InitCtx<'a> {
    pub images: &'a dyn ImageLibrary,
    pub config: &'a SimConfig,
    pub rng: &'a mut StdRng,
    /// Companions to create right after this sprite.
    pub spawns: &'a mut Vec<SpawnRequest>,
}

impl InitCtx<'_> {
    /// Width and per-frame height of `id`'s sheet cut into `frames` rows.
    pub(crate) fn sheet(&self, id: ImageId, frames: u16) -> Option<(i32, i32)> {
        match self.images.image(id) {
            Some(info) => Some((info.width, info.frame_height(frames))),
            None => {
                log::warn!("no sheet loaded for image {}", id.0);
                None
            }
        }
    }

    pub(crate) fn random(&mut self, lower: i32, upper: i32) -> i32 {
        random_range(self.rng, lower, upper)
    }
}

pub struct UpdateCtx<'a> {
    pub handle: SpriteHandle,
    pub scroll: f32,
    pub hero: &'a HeroState,
    pub config: &'a SimConfig,
    pub rng: &'a mut StdRng,
    /// Other sprites, read-only. The sprite being updated is checked out.
    pub pool: &'a SpritePool,
    pub registries: &'a mut Registries,
    pub spawns: &'a mut Vec<SpawnRequest>,
    pub sounds: &'a mut Vec<SoundCue>,
}

impl UpdateCtx<'_> {
    pub(crate) fn play(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    pub(crate) fn spawn(&mut self, request: SpawnRequest) {
        self.spawns.push(request);
    }

    pub(crate) fn random(&mut self, lower: i32, upper: i32) -> i32 {
        random_range(self.rng, lower, upper)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Destroy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TentPhase {
    Hidden,
    Popping,
    Stunned,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShelfPhase {
    Standing,
    Falling,
    Fallen,
}

/// Per-sprite state machine plus its scratch data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Scrolls with the world; `nudge` is spent on the first frame past x = 0.
    Scenery { nudge: bool },
    /// Never changes on its own.
    Still,
    Employee,
    BowlingBall,
    BouncingBall,
    BouncingBomb,
    Grill,
    PunchingBag { step: i32 },
    TentGuy { armed: bool, phase: TentPhase },
    FallingShelf { sound_pending: bool, phase: ShelfPhase },
    Pickup { animated: bool, chime: bool },
    Bomb,
    Series { id: ImageId, spawned: i32, total: i32 },
    Archer,
    Arrow,
    Explosion { sounded: bool },
    Bicycle { bell: u32 },
    ScreenshotNotice { sound_pending: bool },
    ScreenshotFade,
}

pub fn init(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    match request.kind {
        SpriteKind::Scenery => scenery::init_scenery(ctx, request),
        SpriteKind::Employee => walkers::init_employee(ctx, request),
        SpriteKind::BowlingShelf => scenery::init_bowling_shelf(ctx, request),
        SpriteKind::BowlingBall => hazards::init_bowling_ball(ctx, request),
        SpriteKind::BouncingBall => hazards::init_bouncing_ball(ctx, request),
        SpriteKind::BouncingBomb => hazards::init_bouncing_bomb(ctx, request),
        SpriteKind::Grill => hazards::init_grill(ctx, request),
        SpriteKind::Tent => ambush::init_tent(ctx, request),
        SpriteKind::TentGuy => ambush::init_tent_guy(ctx, request),
        SpriteKind::PunchingBag => hazards::init_punching_bag(ctx, request),
        SpriteKind::RandomShelf => scenery::init_random_shelf(ctx, request),
        SpriteKind::FallingShelf => scenery::init_falling_shelf(ctx, request),
        SpriteKind::PowerUp => scenery::init_power_up(ctx, request),
        SpriteKind::Twinkle => scenery::init_twinkle(ctx, request),
        SpriteKind::Bomb => hazards::init_bomb(ctx, request),
        SpriteKind::Series => scenery::init_series(ctx, request),
        SpriteKind::Archer => walkers::init_archer(ctx, request),
        SpriteKind::Arrow => walkers::init_arrow(ctx, request),
        SpriteKind::Explosion => hazards::init_explosion(ctx, request),
        SpriteKind::Bicycle => walkers::init_bicycle(ctx, request),
        SpriteKind::ScreenshotText => scenery::init_screenshot_text(ctx, request),
        SpriteKind::LevelCompleteText => scenery::init_level_complete(ctx, request),
    }
}

pub fn update(sprite: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    match sprite.behavior {
        Behavior::Scenery { .. } => scenery::update_scenery(sprite, ctx),
        Behavior::Still => Step::Continue,
        Behavior::Employee => walkers::update_employee(sprite, ctx),
        Behavior::BowlingBall => hazards::update_bowling_ball(sprite, ctx),
        Behavior::BouncingBall => hazards::update_bouncing_ball(sprite, ctx),
        Behavior::BouncingBomb => hazards::update_bouncing_bomb(sprite, ctx),
        Behavior::Grill => hazards::update_grill(sprite, ctx),
        Behavior::PunchingBag { .. } => hazards::update_punching_bag(sprite, ctx),
        Behavior::TentGuy { .. } => ambush::update_tent_guy(sprite, ctx),
        Behavior::FallingShelf { .. } => scenery::update_falling_shelf(sprite, ctx),
        Behavior::Pickup { .. } => scenery::update_pickup(sprite, ctx),
        Behavior::Bomb => hazards::update_bomb(sprite, ctx),
        Behavior::Series { .. } => scenery::update_series(sprite, ctx),
        Behavior::Archer => walkers::update_archer(sprite, ctx),
        Behavior::Arrow => walkers::update_arrow(sprite, ctx),
        Behavior::Explosion { .. } => hazards::update_explosion(sprite, ctx),
        Behavior::Bicycle { .. } => walkers::update_bicycle(sprite, ctx),
        Behavior::ScreenshotNotice { .. } | Behavior::ScreenshotFade => {
            scenery::update_screenshot_text(sprite, ctx)
        }
    }
}

/// Sprite cut from `image` into `frames` rows, placed where `request` asks.
pub(crate) fn from_sheet(ctx: &InitCtx, request: &SpawnRequest, image: ImageId, frames: u16) -> Option<Sprite> {
    let (w, h) = ctx.sheet(image, frames)?;
    let mut sprite = Sprite::new(request.kind, image, request.x, request.y, request.z);
    sprite.frames = frames;
    sprite.w = w;
    sprite.h = h;
    sprite.layer = request.layer;
    sprite.ground = ctx.config.floor_for(h);
    Some(sprite)
}

/// Shifts a sprite against the world scroll. Sub-pixel scrolls are ignored.
pub(crate) fn drift(sprite: &mut Sprite, scroll: f32) {
    if scroll as i32 != 0 {
        sprite.x -= scroll;
    }
}

pub(crate) fn block(sprite: &mut Sprite, ctx: &UpdateCtx) {
    resolve_sprite(sprite, ctx.pool, &ctx.registries.blockers, ctx.config);
}

/// One vertical step of a bouncing sprite: falls under gravity and rebounds
/// with its launch velocity on touching the ground.
pub(crate) fn bounce(sprite: &mut Sprite) {
    if sprite.delay_y.tick() {
        if sprite.y + sprite.vel_y_cur < sprite.ground {
            sprite.y += sprite.vel_y_cur;
            sprite.vel_y_cur += sprite.gravity;
        } else {
            sprite.y = sprite.ground;
            sprite.vel_y_cur = sprite.vel_y;
        }
    }
}

/// Random launch shared by bouncing balls and bouncing bombs: enters from
/// either screen edge at a random speed, with a gravity matched to the
/// launch velocity.
pub(crate) fn launch(sprite: &mut Sprite, ctx: &mut InitCtx) {
    let dir = if ctx.random(0, 1) == 1 { -1 } else { 1 };
    let lift = ctx.random(20, 30);
    sprite.x = if dir > 0 { 1.0 } else { 475.0 };
    sprite.vel_x = (dir * ctx.random(2, 8)) as f32;
    sprite.vel_y = -lift;
    sprite.vel_y_cur = sprite.vel_y;
    sprite.gravity = match lift {
        ..=24 => ctx.random(5, 7),
        25..=29 => ctx.random(6, 12),
        _ => ctx.random(6, 10),
    };
    sprite.facing = if dir > 0 { Facing::East } else { Facing::West };
}

/// Shared reaction to a hit: the sprite is thrown up and away from the
/// hero, falls back to the ground, lingers a moment and is destroyed.
pub(crate) fn knockback(sprite: &mut Sprite, ctx: &mut UpdateCtx, cue: SoundCue) -> Step {
    if sprite.collision != Collision::Acknowledged {
        ctx.play(cue);
        sprite.collision = Collision::Acknowledged;
        if sprite.collision_dir != sprite.facing {
            sprite.vel_x = if sprite.vel_x > 0.0 { -4.0 } else { 4.0 };
        }
        sprite.frame = sprite.frame_at(0);
        sprite.vel_y_cur = sprite.vel_y;
        sprite.jumping = true;
        sprite.weapon_active = false;
    }

    drift(sprite, ctx.scroll);
    if sprite.moving && sprite.delay_x.tick() {
        sprite.x += sprite.vel_x;
    }

    if sprite.jumping && sprite.delay_y.is_due() {
        sprite.delay_y.current = 0;
        if sprite.y + sprite.vel_y_cur < sprite.ground {
            sprite.y += sprite.vel_y_cur;
            sprite.vel_y_cur += sprite.gravity;
        } else {
            sprite.y = sprite.ground;
            sprite.jumping = false;
        }
    } else if !sprite.jumping && sprite.delay_y.is_due() {
        return Step::Destroy;
    }

    block(sprite, ctx);
    sprite.delay_y.current = sprite.delay_y.current.saturating_add(1);
    Step::Continue
}


#[cfg(test)]
mod tests {
    use super::testkit::Bench;
    use super::*;

    #[test]
    fn ids_map_to_kinds() {
        assert_eq!(SpriteKind::from_id(ImageId::EMPLOYEE, Layer::Active), Some(SpriteKind::Employee));
        assert_eq!(SpriteKind::from_id(ImageId(53), Layer::Active), Some(SpriteKind::Tent));
        assert_eq!(SpriteKind::from_id(ImageId::ANY_BICYCLE, Layer::Active), Some(SpriteKind::Bicycle));
        assert_eq!(SpriteKind::from_id(ImageId(59), Layer::Background), Some(SpriteKind::Scenery));
        assert_eq!(SpriteKind::from_id(ImageId(59), Layer::Active), None);
    }

    #[test]
    fn sub_pixel_scroll_does_not_drift() {
        let mut bench = Bench::new();
        let mut sprite = bench.make(SpriteKind::Scenery, ImageId(59), 100.0, 10, Layer::Background);
        drift(&mut sprite, 0.75);
        assert_eq!(sprite.x, 100.0);
        drift(&mut sprite, 2.5);
        assert_eq!(sprite.x, 97.5);
    }

    #[test]
    fn launch_picks_an_edge_and_matching_heading() {
        let mut bench = Bench::new();
        for _ in 0..50 {
            let ball = bench.make(SpriteKind::BouncingBall, ImageId::BASKETBALL, 0.0, 0, Layer::Active);
            match ball.facing {
                Facing::East => assert!(ball.x == 1.0 && ball.vel_x >= 2.0),
                Facing::West => assert!(ball.x == 475.0 && ball.vel_x <= -2.0),
                Facing::Still => panic!("ball launched without heading"),
            }
            assert!((5..=12).contains(&ball.gravity));
            assert!((-30..=-20).contains(&ball.vel_y));
        }
    }

    #[test]
    fn knockback_throws_then_destroys() {
        let mut bench = Bench::new();
        let mut sprite = bench.make(SpriteKind::Employee, ImageId::EMPLOYEE, 0.0, 0, Layer::Active);
        sprite.collision = Collision::HitByWeapon;
        sprite.collision_dir = Facing::East;
        let ground = sprite.ground;

        let handle = bench.pool.allocate(Sprite::new(SpriteKind::Scenery, ImageId(0), 0.0, 0, 0.0)).expect("slot");
        let mut ctx = UpdateCtx {
            handle,
            scroll: 0.0,
            hero: &bench.hero,
            config: &bench.config,
            rng: &mut bench.rng,
            pool: &bench.pool,
            registries: &mut bench.registries,
            spawns: &mut bench.spawns,
            sounds: &mut bench.sounds,
        };
        assert_eq!(knockback(&mut sprite, &mut ctx, SoundCue::EmployeeHit), Step::Continue);
        assert_eq!(sprite.collision, Collision::Acknowledged);
        assert!(sprite.jumping);
        assert!(!sprite.weapon_active);
        assert_eq!(sprite.vel_x, 4.0);

        let mut frames = 1;
        while knockback(&mut sprite, &mut ctx, SoundCue::EmployeeHit) == Step::Continue {
            frames += 1;
            assert!(frames < 200, "knockback never finished");
        }
        assert_eq!(sprite.y, ground);
        assert_eq!(bench.sounds, vec![SoundCue::EmployeeHit]);
    }
}
