//! The sprite world: pool, draw list, registries and the per-frame loop.
//!
//! A frame runs [`SpriteWorld::detect_collisions`], then
//! [`SpriteWorld::update_all`], then [`SpriteWorld::draw_all`]. Nothing here
//! is global; several worlds can run side by side.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::behavior::{self, InitCtx, SpawnParams, SpawnRequest, SpriteKind, Step, UpdateCtx};
use crate::collision::{self, HeroBlockQuery, HeroBlockResult};
use crate::config::SimConfig;
use crate::draw_list::{DrawList, NodeId};
use crate::helpers::random_range;
use crate::hero::{HeroLink, HeroState};
use crate::pool::{SpriteHandle, SpritePool};
use crate::registry::{Registries, Registry};
use crate::render::{self, Canvas};
use crate::resources::{ImageId, ImageLibrary, SoundCue};
use crate::sprite::{Layer, Sprite};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawItem {
    Sprite(SpriteHandle),
    /// Something drawn by the caller (hero, power meter), identified by tag.
    Overlay(u32),
}

pub trait Backdrop {
    fn scroll_offset(&self) -> f32;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldScroll {
    pub offset: f32,
}

impl WorldScroll {
    pub fn advance(&mut self, delta: f32) {
        self.offset += delta;
    }
}

impl Backdrop for WorldScroll {
    fn scroll_offset(&self) -> f32 {
        self.offset
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenshotText {
    Capturing,
    Saved,
}

impl ScreenshotText {
    fn image(self) -> ImageId {
        match self {
            Self::Capturing => ImageId::SCREENSHOT_TEXT,
            Self::Saved => ImageId::SCREENSHOT_DONE_TEXT,
        }
    }
}

/// Screen x for a sprite placed at `world_x` once the world has scrolled to
/// `offset`. The fractional part matches every other sprite on screen so
/// neighbours never open a one-pixel seam.
pub fn screen_x_for(world_x: f32, offset: f32) -> f32 {
    let whole = offset.trunc();
    let frac = offset - whole;
    let align = if frac > 0.0 { 1.0 - frac } else { 0.0 };
    world_x - whole + align
}

pub struct SpriteWorld {
    config: SimConfig,
    pool: SpritePool,
    draw_list: DrawList<DrawItem>,
    registries: Registries,
    rng: StdRng,
    images: Box<dyn ImageLibrary>,
    sounds: Vec<SoundCue>,
    pending: Vec<SpawnRequest>,
    screenshot_text: Option<SpriteHandle>,
    level_complete: Option<SpriteHandle>,
}

impl SpriteWorld {
    /// World seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: SimConfig, images: Box<dyn ImageLibrary>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, images, rng)
    }

    pub fn with_seed(config: SimConfig, images: Box<dyn ImageLibrary>, seed: u64) -> Self {
        Self::with_rng(config, images, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, images: Box<dyn ImageLibrary>, rng: StdRng) -> Self {
        Self {
            pool: SpritePool::new(config.max_sprites),
            draw_list: DrawList::new(),
            registries: Registries::new(&config),
            config,
            rng,
            images,
            sounds: Vec::new(),
            pending: Vec::new(),
            screenshot_text: None,
            level_complete: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Creates a sprite and links it into the draw list. Companions the
    /// sprite asks for are created right after it.
    ///
    /// Spawning is best effort: a full pool or a kind that cannot be built
    /// gives `None` and changes nothing.
    pub fn spawn(&mut self, request: SpawnRequest) -> Option<SpriteHandle> {
        if !self.pool.has_free_slot() {
            log::debug!("pool full, {:?} at x {} dropped", request.kind, request.x);
            return None;
        }

        let mut companions = Vec::new();
        let mut ctx = InitCtx {
            images: self.images.as_ref(),
            config: &self.config,
            rng: &mut self.rng,
            spawns: &mut companions,
        };
        let sprite = behavior::init(&mut ctx, &request)?;

        let z = sprite.z;
        let handle = self.pool.allocate(sprite)?;
        let node = self.draw_list.insert(z, DrawItem::Sprite(handle));
        if let Some(sprite) = self.pool.get_mut(handle) {
            sprite.node = Some(node);
        }

        for companion in companions {
            self.spawn(companion);
        }
        Some(handle)
    }

    /// Spawn by image id, the way level data names sprites. Unknown ids on
    /// the active layer are ignored.
    pub fn spawn_id(
        &mut self,
        id: ImageId,
        x: f32,
        y: i32,
        z: f32,
        layer: Layer,
        params: SpawnParams,
    ) -> Option<SpriteHandle> {
        match SpawnRequest::from_id(id, x, y, z, layer, params) {
            Some(request) => self.spawn(request),
            None => {
                log::debug!("no sprite kind for image {} on the {layer:?} layer", id.0);
                None
            }
        }
    }

    /// Spawn at an absolute world x, converted to screen space with the
    /// backdrop's current scroll.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_at_world(
        &mut self,
        world_x: f32,
        y: i32,
        z: f32,
        id: ImageId,
        layer: Layer,
        params: SpawnParams,
        backdrop: &dyn Backdrop,
    ) -> Option<SpriteHandle> {
        let x = screen_x_for(world_x, backdrop.scroll_offset());
        self.spawn_id(id, x, y, z, layer, params)
    }

    /// Frees the sprite, unlinks it and drops it from every registry.
    /// Stale handles are a no-op.
    pub fn destroy(&mut self, handle: SpriteHandle) -> bool {
        match self.pool.free(handle) {
            Some(sprite) => {
                self.unlink(handle, sprite.node);
                true
            }
            None => {
                log::debug!("destroy of stale sprite {}", handle.index());
                false
            }
        }
    }

    pub fn disable(&mut self, handle: SpriteHandle) -> bool {
        self.destroy(handle)
    }

    fn unlink(&mut self, handle: SpriteHandle, node: Option<NodeId>) {
        if let Some(node) = node {
            self.draw_list.remove(node);
        }
        self.registries.forget(handle);
        if self.screenshot_text == Some(handle) {
            self.screenshot_text = None;
        }
        if self.level_complete == Some(handle) {
            self.level_complete = None;
        }
    }

    /// Level reset: every sprite goes, registries and queued spawns are
    /// cleared. Overlays stay linked.
    pub fn destroy_all(&mut self) {
        let handles: Vec<_> = self.pool.handles().collect();
        let count = handles.len();
        for handle in handles {
            if let Some(node) = self.pool.free(handle).and_then(|sprite| sprite.node) {
                self.draw_list.remove(node);
            }
        }
        self.registries.clear();
        self.pending.clear();
        self.screenshot_text = None;
        self.level_complete = None;
        log::debug!("level cleared, {count} sprites destroyed");
    }

    /// Advances every live sprite by one frame, in slot order. Returns how
    /// many sprites were updated.
    ///
    /// Spawns a sprite asks for are applied right after its own update, so a
    /// child landing in a later slot is updated this frame as well.
    pub fn update_all(&mut self, scroll: f32, hero: &HeroState) -> usize {
        let mut updated = 0;
        for index in 0..self.pool.capacity() {
            let Some(handle) = self.pool.handle_at(index) else {
                continue;
            };
            let Some(mut sprite) = self.pool.take(handle) else {
                continue;
            };

            let step = {
                let mut ctx = UpdateCtx {
                    handle,
                    scroll,
                    hero,
                    config: &self.config,
                    rng: &mut self.rng,
                    pool: &self.pool,
                    registries: &mut self.registries,
                    spawns: &mut self.pending,
                    sounds: &mut self.sounds,
                };
                behavior::update(&mut sprite, &mut ctx)
            };
            updated += 1;

            match step {
                Step::Continue => self.pool.restore(handle, sprite),
                Step::Destroy => {
                    self.pool.free(handle);
                    self.unlink(handle, sprite.node);
                }
            }

            for request in std::mem::take(&mut self.pending) {
                self.spawn(request);
            }
        }
        updated
    }

    /// One detection pass: hero weapon and projectiles against every active
    /// sprite, sprite weapons against the hero.
    pub fn detect_collisions(&mut self, hero: &mut dyn HeroLink) {
        collision::detect(&mut self.pool, &self.registries.projectiles, hero);
    }

    pub fn resolve_hero(&self, query: HeroBlockQuery) -> HeroBlockResult {
        collision::resolve_hero(&self.pool, &self.registries.blockers, query, &self.config)
    }

    pub fn draw_all(&mut self, canvas: &mut dyn Canvas) {
        while self.draw_list.advance() {
            let Some((_, item)) = self.draw_list.current() else {
                break;
            };
            match *item {
                DrawItem::Sprite(handle) => {
                    if let Some(blit) = self
                        .pool
                        .get(handle)
                        .and_then(|sprite| render::blit_for(sprite, self.config.screen_width))
                    {
                        canvas.blit(&blit);
                    }
                }
                DrawItem::Overlay(tag) => canvas.overlay(tag),
            }
        }
    }

    pub fn attach_overlay(&mut self, key: f32, tag: u32) -> NodeId {
        self.draw_list.insert(key, DrawItem::Overlay(tag))
    }

    pub fn detach_overlay(&mut self, node: NodeId) -> bool {
        if !matches!(self.draw_list.get(node), Some(DrawItem::Overlay(_))) {
            return false;
        }
        self.draw_list.remove(node).is_some()
    }

    /// Spawns something to keep an idle hero busy.
    pub fn create_random_sprite(&mut self) -> Option<SpriteHandle> {
        let id = match random_range(&mut self.rng, 0, 4) {
            0 => ImageId(random_range(&mut self.rng, 6, 8) as u16),
            1 => ImageId::EMPLOYEE,
            2 => ImageId::BOUNCE_BOMB,
            3 => ImageId::BOMB,
            _ => ImageId::ANY_BICYCLE,
        };
        self.spawn_id(id, 0.0, 0, 9.0, Layer::Active, SpawnParams::None)
    }

    pub fn create_screenshot_text(&mut self, which: ScreenshotText) -> Option<SpriteHandle> {
        let image = which.image();
        let handle = self.spawn(SpawnRequest::new(
            SpriteKind::ScreenshotText,
            image,
            0.0,
            0,
            0.0,
            Layer::Background,
        ))?;
        self.screenshot_text = Some(handle);
        Some(handle)
    }

    /// Removes the screenshot notice if one is still up.
    pub fn destroy_screenshot_text(&mut self) -> bool {
        let Some(handle) = self.screenshot_text else {
            return false;
        };
        let is_notice = self.pool.get(handle).is_some_and(|s| {
            s.image == ImageId::SCREENSHOT_TEXT || s.image == ImageId::SCREENSHOT_DONE_TEXT
        });
        self.screenshot_text = None;
        is_notice && self.destroy(handle)
    }

    /// Shows the level-complete banner, creating it on first use. Row 0 is
    /// the "complete" message, any other value the second message.
    pub fn create_level_complete_text(&mut self, row: u32) -> Option<SpriteHandle> {
        if self.level_complete.is_none() {
            self.level_complete = self.spawn(SpawnRequest::new(
                SpriteKind::LevelCompleteText,
                ImageId::LEVEL_COMPLETE_TEXT,
                0.0,
                0,
                12.0,
                Layer::Background,
            ));
        }
        let handle = self.level_complete?;
        let sprite = self.pool.get_mut(handle)?;
        sprite.frame = if row == 0 { 0 } else { 1 };
        Some(handle)
    }

    /// Forces every blinking sprite visible, for a clean screenshot.
    pub fn show_blink_sprites(&mut self) {
        let handles: Vec<_> = self.registries.blinkers.iter().collect();
        for handle in handles {
            if let Some(sprite) = self.pool.get_mut(handle) {
                sprite.show = true;
            }
        }
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    pub fn sprite(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.pool.get(handle)
    }

    pub fn sprite_mut(&mut self, handle: SpriteHandle) -> Option<&mut Sprite> {
        self.pool.get_mut(handle)
    }

    pub fn active_handles(&self) -> Vec<SpriteHandle> {
        self.pool.handles().collect()
    }

    pub fn count_active(&self) -> usize {
        self.pool.count_active()
    }

    pub fn blockers(&self) -> &Registry {
        &self.registries.blockers
    }

    pub fn projectiles(&self) -> &Registry {
        &self.registries.projectiles
    }

    pub fn blinkers(&self) -> &Registry {
        &self.registries.blinkers
    }

    pub fn draw_order(&self) -> impl Iterator<Item = (f32, DrawItem)> + '_ {
        self.draw_list.iter().map(|(key, item)| (key, *item))
    }

    pub fn draw_len(&self) -> usize {
        self.draw_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{Bounds, Facing};
    use crate::hero::{ScriptedHero, WeaponPhase};
    use crate::render::Blit;
    use crate::resources::SheetCatalog;
    use crate::sprite::Collision;

    fn world() -> SpriteWorld {
        SpriteWorld::with_seed(SimConfig::default(), Box::new(SheetCatalog::builtin()), 3)
    }

    fn hero_at(x: f32) -> HeroState {
        HeroState {
            x,
            y: 180,
            facing: Facing::East,
            body: Bounds::new(10, 0, 40, 80),
            weapon: WeaponPhase::Idle,
            weapon_bounds: Bounds::new(40, 20, 70, 60),
        }
    }

    fn scenery(world: &mut SpriteWorld, x: f32, z: f32) -> SpriteHandle {
        world
            .spawn(SpawnRequest::new(SpriteKind::Scenery, ImageId(59), x, 10, z, Layer::Background))
            .expect("scenery spawns")
    }

    #[derive(Default)]
    struct Recorder {
        blits: Vec<Blit>,
        overlays: Vec<u32>,
    }

    impl Canvas for Recorder {
        fn blit(&mut self, blit: &Blit) {
            self.blits.push(*blit);
        }

        fn overlay(&mut self, tag: u32) {
            self.overlays.push(tag);
        }
    }

    #[test]
    fn world_to_screen_keeps_the_scroll_fraction() {
        assert_eq!(screen_x_for(500.0, 0.0), 500.0);
        assert_eq!(screen_x_for(500.0, 120.0), 380.0);
        assert_eq!(screen_x_for(500.0, 120.25), 380.75);
    }

    #[test]
    fn spawn_at_world_uses_the_backdrop() {
        let mut world = world();
        let mut scroll = WorldScroll::default();
        scroll.advance(100.5);
        let handle = world
            .spawn_at_world(300.0, 10, 1.0, ImageId(59), Layer::Background, SpawnParams::None, &scroll)
            .expect("spawned");
        assert_eq!(world.sprite(handle).map(|s| s.x), Some(200.5));
    }

    #[test]
    fn full_pool_drops_spawns() {
        let config = SimConfig {
            max_sprites: 2,
            ..SimConfig::default()
        };
        let mut world = SpriteWorld::with_seed(config, Box::new(SheetCatalog::builtin()), 1);
        assert!(scenery(&mut world, 0.0, 1.0).index() == 0);
        scenery(&mut world, 0.0, 1.0);
        assert!(
            world
                .spawn(SpawnRequest::new(SpriteKind::Scenery, ImageId(59), 0.0, 0, 1.0, Layer::Background))
                .is_none()
        );
        assert_eq!(world.count_active(), 2);
        assert_eq!(world.draw_len(), 2);
    }

    #[test]
    fn unknown_active_id_is_ignored() {
        let mut world = world();
        assert!(world.spawn_id(ImageId(59), 0.0, 0, 1.0, Layer::Active, SpawnParams::None).is_none());
        assert_eq!(world.count_active(), 0);
    }

    #[test]
    fn init_may_override_the_draw_key() {
        let mut world = world();
        let text = world.create_screenshot_text(ScreenshotText::Capturing).expect("notice");
        let node = world.sprite(text).and_then(Sprite::node).expect("linked");
        assert_eq!(world.draw_list.key(node), Some(11.2));
    }

    #[test]
    fn tent_brings_its_guy() {
        let mut world = world();
        world
            .spawn_id(ImageId::TENT_GREEN, 200.0, 120, 4.0, Layer::Active, SpawnParams::Facing(Facing::West))
            .expect("tent");
        assert_eq!(world.count_active(), 2);
        let kinds: Vec<_> = world
            .active_handles()
            .into_iter()
            .filter_map(|h| world.sprite(h).map(|s| s.kind))
            .collect();
        assert_eq!(kinds, vec![SpriteKind::Tent, SpriteKind::TentGuy]);
    }

    #[test]
    fn destroy_unlinks_and_is_idempotent() {
        let mut world = world();
        let a = scenery(&mut world, 10.0, 1.0);
        world.registries.blockers.add(a);
        assert!(world.destroy(a));
        assert!(!world.destroy(a));
        assert_eq!(world.count_active(), 0);
        assert_eq!(world.draw_len(), 0);
        assert!(world.blockers().is_empty());
    }

    #[test]
    fn destroy_all_keeps_overlays() {
        let mut world = world();
        scenery(&mut world, 10.0, 1.0);
        scenery(&mut world, 20.0, 3.0);
        let hero = world.attach_overlay(2.0, 7);
        world.destroy_all();
        assert_eq!(world.count_active(), 0);
        assert_eq!(world.draw_order().map(|(_, item)| item).collect::<Vec<_>>(), vec![DrawItem::Overlay(7)]);
        assert!(world.detach_overlay(hero));
        assert!(!world.detach_overlay(hero));
    }

    #[test]
    fn draw_interleaves_overlays_by_depth() {
        let mut world = world();
        scenery(&mut world, 10.0, 1.0);
        world.attach_overlay(5.0, 42);
        scenery(&mut world, 20.0, 9.0);
        let mut canvas = Recorder::default();
        world.draw_all(&mut canvas);
        assert_eq!(canvas.blits.len(), 2);
        assert_eq!(canvas.blits[0].x, 10.0);
        assert_eq!(canvas.overlays, vec![42]);

        let mut again = Recorder::default();
        world.draw_all(&mut again);
        assert_eq!(again.blits.len(), 2);
    }

    #[test]
    fn update_spawns_children_the_same_frame() {
        let mut world = world();
        world
            .spawn_id(
                ImageId::SERIES,
                0.0,
                0,
                9.0,
                Layer::Active,
                SpawnParams::Series {
                    id: ImageId::BASKETBALL,
                    count: 2,
                    interval: 0,
                },
            )
            .expect("series");
        let updated = world.update_all(0.0, &hero_at(100.0));
        assert!(world.count_active() >= 2);
        assert_eq!(updated, world.count_active());
    }

    #[test]
    fn weapon_hit_is_acknowledged_by_the_next_update() {
        let mut world = world();
        let employee = world
            .spawn_id(ImageId::EMPLOYEE, 150.0, 0, 5.0, Layer::Active, SpawnParams::None)
            .expect("employee");
        let (ex, ey) = world.sprite(employee).map(|s| (s.x, s.y)).expect("live");
        let mut hero = ScriptedHero::new(HeroState {
            x: ex - 40.0,
            y: ey,
            weapon: WeaponPhase::Striking,
            ..hero_at(0.0)
        });

        world.detect_collisions(&mut hero);
        assert_eq!(world.sprite(employee).map(|s| s.collision), Some(Collision::HitByWeapon));
        world.update_all(0.0, &hero.state);
        let s = world.sprite(employee).expect("still live");
        assert_eq!(s.collision, Collision::Acknowledged);
        assert!(s.jumping);
        assert_eq!(world.drain_sounds(), vec![SoundCue::EmployeeHit]);
        assert!(world.drain_sounds().is_empty());
    }

    #[test]
    fn level_complete_text_is_created_once() {
        let mut world = world();
        let first = world.create_level_complete_text(0).expect("banner");
        let second = world.create_level_complete_text(2).expect("banner");
        assert_eq!(first, second);
        assert_eq!(world.sprite(first).map(|s| s.frame), Some(1));
        assert_eq!(world.count_active(), 1);
    }

    #[test]
    fn screenshot_text_is_destroyed_once() {
        let mut world = world();
        world.create_screenshot_text(ScreenshotText::Saved).expect("notice");
        assert!(world.destroy_screenshot_text());
        assert!(!world.destroy_screenshot_text());
        assert_eq!(world.count_active(), 0);
    }

    #[test]
    fn random_sprites_are_active() {
        let mut world = world();
        for _ in 0..20 {
            if let Some(handle) = world.create_random_sprite() {
                assert_eq!(world.sprite(handle).map(|s| s.layer), Some(Layer::Active));
            }
            world.destroy_all();
        }
    }

    #[test]
    fn blinkers_are_forced_visible() {
        let mut world = world();
        let a = scenery(&mut world, 10.0, 1.0);
        if let Some(s) = world.sprite_mut(a) {
            s.show = false;
        }
        world.registries.blinkers.add(a);
        world.show_blink_sprites();
        assert_eq!(world.sprite(a).map(|s| s.show), Some(true));
    }
}
