//! Tents and the ambusher hiding in each of them.

use super::{Behavior, InitCtx, SpawnParams, SpawnRequest, SpriteKind, Step, TentPhase, UpdateCtx, drift, from_sheet};
use crate::helpers::{Bounds, Facing};
use crate::resources::{ImageId, SoundCue};
use crate::sprite::{Collision, Delay, Layer, Sprite};

/// Distance at which a hidden tent guy pops out.
const AMBUSH_RANGE: f32 = 90.0;

/// Tents are always scenery. A tent placed on the active layer also
/// queues the tent guy that lives in it.
pub fn init_tent(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let mut s = from_sheet(ctx, request, request.image, 2)?;
    s.layer = Layer::Background;
    s.behavior = Behavior::Scenery { nudge: true };
    s.facing = request.facing_or(Facing::West);
    s.frame = if s.facing == Facing::East { 0 } else { 1 };

    if request.layer == Layer::Active {
        let offset = if s.facing == Facing::West { -5.0 } else { 82.0 };
        ctx.spawns.push(
            SpawnRequest::new(SpriteKind::TentGuy, ImageId::TENT_GUY, request.x + offset, request.y, 8.0, Layer::Active)
                .with_params(SpawnParams::Facing(s.facing)),
        );
    }
    Some(s)
}

pub fn init_tent_guy(ctx: &mut InitCtx, request: &SpawnRequest) -> Option<Sprite> {
    let s = from_sheet(ctx, request, request.image, 12)?;
    let mut s = s.with_order(&[0, 1, 2, 3, 4, 5], &[6, 7, 8, 9, 10, 11]);
    s.behavior = Behavior::TentGuy {
        armed: true,
        phase: TentPhase::Hidden,
    };
    s.facing = request.facing_or(Facing::West);
    s.delay_frame = Delay::new(4);
    s.delay_hold = Delay::new(70);
    s.vel_x = 1.0;
    s.frame_count = 5;
    s.show = false;

    s.body = Bounds::new(22, 31, 70, 72);
    s.weapon = Bounds::new(34, 57, 44, 44);
    if s.facing == Facing::East {
        s.body.left = 20;
        s.body.right = 86;
        s.weapon.left = 20;
    }
    s.frame = s.frame_at(0);
    Some(s)
}

/// Pops out of its tent when the hero walks up, swings once and ducks back
/// in. A hit during the swing stuns it; it blinks for a while and is gone.
///
/// The guy only re-arms after the hero has left its range, so standing next
/// to the tent does not keep it popping.
pub fn update_tent_guy(s: &mut Sprite, ctx: &mut UpdateCtx) -> Step {
    let Behavior::TentGuy { mut armed, mut phase } = s.behavior else {
        return Step::Continue;
    };

    drift(s, ctx.scroll);

    if phase == TentPhase::Hidden {
        if (s.x - ctx.hero.x).abs() < AMBUSH_RANGE {
            if armed {
                s.collision = Collision::None;
                s.frame_index = 0;
                phase = TentPhase::Popping;
                s.show = true;
                s.delay_frame.current = 0;
                s.vel_x = s.vel_x.abs();
            }
        } else {
            armed = true;
        }
    }

    if phase == TentPhase::Popping && s.delay_frame.tick() {
        s.frame_index += s.vel_x as i32;
        if s.frame_index == 2 {
            s.weapon_active = s.vel_x > 0.0;
        }
        if s.frame_index > s.frame_count - 1 {
            s.vel_x = -1.0;
            s.frame_index = s.frame_count - 1;
        } else if s.frame_index < 0 {
            s.frame_index = 0;
            phase = TentPhase::Hidden;
            s.show = false;
            armed = false;
        }
    }

    if s.collision != Collision::None && s.frame_index >= 1 && s.frame_index < s.frame_count {
        ctx.registries.blinkers.add(ctx.handle);
        ctx.play(SoundCue::TentHit);
        s.delay_hold.current += 1;
        s.frame_index = s.frame_count;
        s.weapon_active = false;
        phase = TentPhase::Stunned;
    }

    if s.delay_hold.current != 0 {
        let blinking = s.delay_hold.current < s.delay_hold.limit;
        s.delay_hold.current = s.delay_hold.current.saturating_add(1);
        if blinking {
            s.show = !s.show;
        } else {
            phase = TentPhase::Done;
            ctx.registries.blinkers.remove(ctx.handle);
        }
    }

    s.frame = s.frame_at(s.frame_index);
    s.behavior = Behavior::TentGuy { armed, phase };

    if s.off_west() || phase == TentPhase::Done {
        ctx.registries.blinkers.remove(ctx.handle);
        return Step::Destroy;
    }
    Step::Continue
}
