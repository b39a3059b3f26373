//! Shelves, pickups, on-screen notices and the invisible series spawner.

use super::{
    Behavior, InitCtx, ShelfPhase, SpawnParams, SpawnRequest, SpriteKind, Step, UpdateCtx, drift, from_sheet,
};
use crate::helpers::Bounds;
use crate::resources::{ImageId, SHELF_SETS, SoundCue};
use crate::sprite::{Collision, Delay, Layer, Sprite};

const SHELF_LAYERS: [ImageId; 3] = [ImageId::SHELF_B, ImageId::SHELF_C, ImageId::SHELF_D];

/// Plain background image. A `ShelfRow` param picks one row of a stacked
/// shelf-layer sheet instead of the whole image.
pub fn init_scenery(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = match request.params {
        SpawnParams::ShelfRow(row) => {
            let mut s = from_sheet(ctx, request, request.image, SHELF_SETS as u16)?;
            s.frame = row.clamp(0, SHELF_SETS - 1);
            s
        }
        _ => from_sheet(ctx, request, request.image, 1)?,
    };
    s.behavior = Behavior::Scenery { nudge: true };
    Some(s)
}

/// Moves with the world and leaves when fully off the west edge.
///
/// On the first frame a sprite sits left of x = 0 it is pulled one more
/// pixel west. Truncation maps both (-1, 0) and [0, 1) to column 0, and
/// without the extra pixel adjacent scenery would show a one pixel seam.
pub fn update_scenery(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if let Behavior::Scenery { nudge } = &mut s.behavior {
        if s.x < 0.0 && *nudge {
            s.x -= 1.0;
            *nudge = false;
        }
    }
    if s.off_west() { Step::Destroy } else { Step::Continue }
}

/// Queues the three lower shelf layers under a top layer, each showing a
/// random row.
fn stack_shelf_layers(ctx: &mut InitCtx, request: &SpawnRequest, top_h: i32, layer: Layer) {
    let mut y = request.y + top_h;
    for image in SHELF_LAYERS {
        let row = ctx.random(0, SHELF_SETS - 1);
        ctx.spawns.push(
            SpawnRequest::new(SpriteKind::Scenery, image, request.x, y, request.z, layer)
                .with_params(SpawnParams::ShelfRow(row)),
        );
        let h = ctx.sheet(image, SHELF_SETS as u16).map(|(_, h)| h).unwrap_or(0);
        y += h;
    }
}

pub fn init_random_shelf(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, SHELF_SETS as u16)?;
    s.behavior = Behavior::Scenery { nudge: true };
    s.frame = ctx.random(0, SHELF_SETS - 1);
    stack_shelf_layers(ctx, request, s.h, request.layer);
    Some(s)
}

/// Empty top shelf over three random layers, with three bowling balls
/// resting on it. On an active shelf each ball has a one in three chance of
/// staying put.
pub fn init_bowling_shelf(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 1)?;
    s.layer = Layer::Background;
    s.behavior = Behavior::Scenery { nudge: true };
    stack_shelf_layers(ctx, request, s.h, Layer::Background);

    for slot in 0..3 {
        let id = ImageId(ctx.random(
            i32::from(ImageId::RED_BOWLING_BALL.0),
            i32::from(ImageId::BLUE_BOWLING_BALL.0),
        ) as u16);
        let layer = if request.layer == Layer::Background || ctx.random(1, 3) == 3 {
            Layer::Background
        } else {
            Layer::Active
        };
        let ball_w = ctx.images.image_width(id);
        let x = request.x + 15.0 + (slot * (ball_w + 5)) as f32;
        ctx.spawns
            .push(SpawnRequest::new(SpriteKind::BowlingBall, id, x, request.y + 16, request.z + 0.5, layer));
    }
    Some(s)
}

pub fn init_falling_shelf(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 11)?;
    s.delay_frame = Delay::new(4);
    s.vel_x = 1.0;
    s.frame_count = 11;
    s.collision = Collision::Acknowledged;
    s.body = Bounds::new(4, 150, s.w - 4, s.h);
    s.weapon = Bounds::new(33, 160, s.w - 33, s.h);
    s.behavior = if request.layer == Layer::Background {
        Behavior::Scenery { nudge: true }
    } else {
        Behavior::FallingShelf {
            sound_pending: true,
            phase: ShelfPhase::Standing,
        }
    };
    Some(s)
}

/// Topples when the hero comes near. The top of the fallen shelf becomes
/// solid at frame 8 and stays solid until it scrolls away.
pub fn update_falling_shelf(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    let Behavior::FallingShelf {
        mut sound_pending,
        mut phase,
    } = s.behavior
    else {
        return Step::Continue;
    };

    drift(s, ctx.scroll);
    if phase == ShelfPhase::Standing && s.x - ctx.hero.x < 125.0 {
        phase = ShelfPhase::Falling;
        if sound_pending {
            sound_pending = false;
            ctx.play(SoundCue::ShelfFall);
        }
    }

    if phase == ShelfPhase::Falling && s.delay_frame.tick() {
        s.frame_index += 1;
        if s.frame_index >= s.frame_count {
            s.frame_index = s.frame_count - 1;
            phase = ShelfPhase::Fallen;
        } else if s.frame_index == 8 {
            ctx.registries.blockers.add(ctx.handle);
        } else if s.frame_index >= 5 {
            s.weapon_active = true;
        }
    }

    s.frame = s.frame_index;
    s.behavior = Behavior::FallingShelf { sound_pending, phase };

    if s.off_west() {
        ctx.registries.blockers.remove(ctx.handle);
        return Step::Destroy;
    }
    Step::Continue
}

pub fn init_power_up(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let bonus_life = request.image == ImageId::BONUS_LIFE;
    let frames = if bonus_life { 1 } else { 6 };
    let mut s = from_sheet(ctx, request, request.image, frames)?;
    s.behavior = Behavior::Pickup {
        animated: false,
        chime: true,
    };
    s.damage = if bonus_life { 100 } else { 1 };
    s.frame = if bonus_life { 0 } else { ctx.random(0, 5) };
    pickup_common(&mut s);

    ctx.spawns.push(SpawnRequest::new(
        SpriteKind::Twinkle,
        ImageId::TWINKLE,
        request.x,
        request.y,
        request.z + 0.1,
        request.layer,
    ));
    Some(s)
}

pub fn init_twinkle(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 3)?;
    s.behavior = Behavior::Pickup {
        animated: true,
        chime: false,
    };
    s.delay_frame = Delay::new(5);
    // touching the twinkle reports contact without affecting the hero
    s.damage = 0;
    pickup_common(&mut s);
    Some(s)
}

fn pickup_common(s: &mut Sprite) {
    s.weapon_active = true;
    s.collision = Collision::Acknowledged;
    s.weapon = Bounds::new(0, 0, s.w - 10, s.h);
}

pub fn update_pickup(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    let Behavior::Pickup { animated, chime } = s.behavior else {
        return Step::Continue;
    };
    if animated && s.delay_frame.tick() {
        s.frame_index += 1;
        if s.frame_index >= i32::from(s.frames) {
            s.frame_index = 0;
        }
        s.frame = s.frame_index;
    }
    if s.hit_hero {
        if chime {
            ctx.play(SoundCue::PowerUp);
        }
        return Step::Destroy;
    }
    drift(s, ctx.scroll);
    if s.off_west() { Step::Destroy } else { Step::Continue }
}

pub fn init_series(_ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let (id, count, interval) = match request.params {
        SpawnParams::Series { id, count, interval } => (id, count, interval),
        _ => (ImageId::BOUNCE_BOMB, 10, 25),
    };
    let mut s = Sprite::new(request.kind, ImageId::BOMB, request.x, 1, 1.0);
    s.behavior = Behavior::Series {
        id,
        spawned: 0,
        total: count,
    };
    s.w = 1;
    s.h = 1;
    s.layer = Layer::Background;
    s.show = false;
    s.collision = Collision::Acknowledged;
    s.damage = 0;
    s.moving = true;
    // the first member appears on the first update
    s.delay_frame = Delay {
        limit: interval,
        current: interval,
    };
    Some(s)
}

/// Emits one member every `interval + 1` frames until `total` have been
/// made, then removes itself.
pub fn update_series(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    drift(s, ctx.scroll);
    if !(s.moving && s.delay_frame.tick()) {
        return Step::Continue;
    }
    if s.x < (-s.w - 100) as f32 {
        return Step::Destroy;
    }
    let Behavior::Series { id, spawned, total } = &mut s.behavior else {
        return Step::Continue;
    };
    if *spawned >= *total {
        return Step::Destroy;
    }
    *spawned += 1;

    let id = if *id == ImageId::BASKETBALL {
        ImageId(ctx.random(i32::from(ImageId::BASKETBALL.0), i32::from(ImageId::SOCCERBALL.0)) as u16)
    } else {
        *id
    };
    match SpawnRequest::from_id(id, 0.0, 0, 9.0, Layer::Active, SpawnParams::None) {
        Some(request) => ctx.spawn(request),
        None => log::debug!("series cannot spawn image {}", id.0),
    }
    Step::Continue
}

pub fn init_screenshot_text(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 1)?;
    s.layer = Layer::Background;
    s.x = (ctx.config.screen_width / 2 - s.w / 2 - 10) as f32;
    s.y = 5;
    if request.image == ImageId::SCREENSHOT_DONE_TEXT {
        s.z = 11.1;
        s.behavior = Behavior::ScreenshotFade;
    } else {
        s.z = 11.2;
        s.behavior = Behavior::ScreenshotNotice { sound_pending: true };
    }
    Some(s)
}

/// The in-progress notice plays the shutter sound once; the saved notice
/// fades out one alpha step per frame.
pub fn update_screenshot_text(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    match &mut s.behavior {
        Behavior::ScreenshotNotice { sound_pending } if *sound_pending => {
            *sound_pending = false;
            ctx.sounds.push(SoundCue::Screenshot);
        }
        Behavior::ScreenshotFade => {
            if s.alpha == 0 {
                return Step::Destroy;
            }
            s.alpha -= 1;
        }
        _ => {}
    }
    Step::Continue
}

pub fn init_level_complete(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 2)?;
    s.layer = Layer::Background;
    s.behavior = Behavior::Still;
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Bench;
    use super::*;

    #[test]
    fn scenery_takes_its_nudge_once() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Scenery, ImageId(59), 1.0, 0, Layer::Background);
        bench.scroll = 1.5;
        bench.run(&mut s, 1);
        assert_eq!(s.x, -1.5);
        bench.run(&mut s, 1);
        assert_eq!(s.x, -3.0);
    }

    #[test]
    fn scenery_leaves_past_its_width() {
        let mut bench = Bench::new();
        let mut s = bench.make(SpriteKind::Scenery, ImageId(59), -79.0, 0, Layer::Background);
        bench.scroll = 1.0;
        assert_eq!(bench.run(&mut s, 1), Step::Destroy);
    }

    #[test]
    fn random_shelf_stacks_three_layers() {
        let mut bench = Bench::new();
        let top = bench.make(SpriteKind::RandomShelf, ImageId::RANDOM_SHELF, 100.0, 20, Layer::Background);
        assert_eq!(top.h, 40);
        assert!((0..10).contains(&top.frame));
        let ys: Vec<i32> = bench.spawns.iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![60, 100, 140]);
        for (request, image) in bench.spawns.iter().zip(SHELF_LAYERS) {
            assert_eq!(request.image, image);
            assert!(matches!(request.params, SpawnParams::ShelfRow(0..=9)));
        }
    }

    #[test]
    fn shelf_row_selects_a_frame() {
        let mut bench = Bench::new();
        let layer = bench.make_with(
            SpawnRequest::new(SpriteKind::Scenery, ImageId::SHELF_C, 0.0, 0, 1.0, Layer::Background)
                .with_params(SpawnParams::ShelfRow(7)),
        );
        assert_eq!((layer.h, layer.frame), (40, 7));
    }

    #[test]
    fn bowling_shelf_lines_up_its_balls() {
        let mut bench = Bench::new();
        let shelf = bench.make(SpriteKind::BowlingShelf, ImageId::BOWLING_SHELF, 100.0, 20, Layer::Background);
        assert_eq!(shelf.layer, Layer::Background);
        let balls: Vec<&SpawnRequest> = bench.spawns.iter().filter(|r| r.kind == SpriteKind::BowlingBall).collect();
        assert_eq!(balls.len(), 3);
        let xs: Vec<f32> = balls.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![115.0, 144.0, 173.0]);
        assert!(balls.iter().all(|r| r.layer == Layer::Background && r.y == 36));
        assert!(balls.iter().all(|r| (42..=45).contains(&r.image.0)));
    }

    #[test]
    fn falling_shelf_turns_solid_at_frame_eight() {
        let mut bench = Bench::new();
        let mut shelf = bench.make(SpriteKind::FallingShelf, ImageId::FALLING_SHELF, 200.0, 0, Layer::Active);
        bench.hero.x = 100.0;
        bench.run(&mut shelf, 5 * 7);
        assert_eq!(shelf.frame_index, 7);
        assert!(shelf.weapon_active);
        assert!(bench.registries.blockers.is_empty());
        bench.run(&mut shelf, 5);
        assert_eq!(shelf.frame_index, 8);
        assert_eq!(bench.registries.blockers.len(), 1);
        bench.run(&mut shelf, 40);
        assert_eq!(shelf.frame, 10);
        assert_eq!(bench.sounds, vec![SoundCue::ShelfFall]);
    }

    #[test]
    fn falling_shelf_leaves_the_blockers_when_gone() {
        let mut bench = Bench::new();
        let mut shelf = bench.make(SpriteKind::FallingShelf, ImageId::FALLING_SHELF, 200.0, 0, Layer::Active);
        bench.run(&mut shelf, 60);
        assert_eq!(bench.registries.blockers.len(), 1);
        shelf.x = -161.0;
        assert_eq!(bench.run(&mut shelf, 1), Step::Destroy);
        assert!(bench.registries.blockers.is_empty());
    }

    #[test]
    fn power_up_brings_a_twinkle() {
        let mut bench = Bench::new();
        let power = bench.make(SpriteKind::PowerUp, ImageId::POWER_UP, 50.0, 60, Layer::Active);
        assert_eq!(power.damage, 1);
        assert!((0..6).contains(&power.frame));
        let twinkle = bench.spawns.pop().expect("twinkle queued");
        assert_eq!(twinkle.kind, SpriteKind::Twinkle);
        assert!((twinkle.z - 5.1).abs() < 1e-6);

        let life = bench.make(SpriteKind::PowerUp, ImageId::BONUS_LIFE, 50.0, 60, Layer::Active);
        assert_eq!((life.damage, life.frame), (100, 0));
    }

    #[test]
    fn pickup_vanishes_on_contact() {
        let mut bench = Bench::new();
        let mut power = bench.make(SpriteKind::PowerUp, ImageId::POWER_UP, 50.0, 60, Layer::Active);
        let mut twinkle = bench.make(SpriteKind::Twinkle, ImageId::TWINKLE, 50.0, 60, Layer::Active);
        assert_eq!(bench.run(&mut power, 3), Step::Continue);
        bench.run(&mut twinkle, 12);
        assert_eq!(twinkle.frame, 2);

        power.hit_hero = true;
        twinkle.hit_hero = true;
        assert_eq!(bench.run(&mut power, 1), Step::Destroy);
        assert_eq!(bench.run(&mut twinkle, 1), Step::Destroy);
        assert_eq!(bench.sounds, vec![SoundCue::PowerUp]);
    }

    #[test]
    fn series_spawns_its_members_then_ends() {
        let mut bench = Bench::new();
        let mut series = bench.make_with(
            SpawnRequest::new(SpriteKind::Series, ImageId::SERIES, 100.0, 0, 1.0, Layer::Background).with_params(
                SpawnParams::Series {
                    id: ImageId::BASKETBALL,
                    count: 3,
                    interval: 4,
                },
            ),
        );
        assert!(!series.show);
        bench.run(&mut series, 1);
        assert_eq!(bench.spawns.len(), 1);
        let mut frames = 1;
        while bench.run(&mut series, 1) == Step::Continue {
            frames += 1;
        }
        assert_eq!(frames, 15);
        assert_eq!(bench.spawns.len(), 3);
        for request in &bench.spawns {
            assert_eq!(request.kind, SpriteKind::BouncingBall);
            assert_eq!(request.z, 9.0);
        }
    }

    #[test]
    fn screenshot_texts() {
        let mut bench = Bench::new();
        let mut busy = bench.make(SpriteKind::ScreenshotText, ImageId::SCREENSHOT_TEXT, 0.0, 0, Layer::Active);
        assert_eq!((busy.x, busy.y), ((240 - 110 - 10) as f32, 5));
        assert_eq!(busy.layer, Layer::Background);
        bench.run(&mut busy, 3);
        assert_eq!(bench.sounds, vec![SoundCue::Screenshot]);

        let mut done = bench.make(SpriteKind::ScreenshotText, ImageId::SCREENSHOT_DONE_TEXT, 0.0, 0, Layer::Active);
        assert!((done.z - 11.1).abs() < 1e-6);
        bench.run(&mut done, 10);
        assert_eq!(done.alpha, 245);
        assert_eq!(bench.run(&mut done, 300), Step::Destroy);
    }

    #[test]
    fn level_complete_text_has_two_rows() {
        let mut bench = Bench::new();
        let text = bench.make(SpriteKind::LevelCompleteText, ImageId::LEVEL_COMPLETE_TEXT, 0.0, 0, Layer::Background);
        assert_eq!(text.h, 40);
        assert_eq!(text.behavior, Behavior::Still);
    }
}
