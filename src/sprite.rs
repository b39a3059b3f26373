use crate::behavior::{Behavior, SpriteKind};
use crate::config::SimConfig;
use crate::draw_list::NodeId;
use crate::helpers::{Aabb, Bounds, Facing};
use crate::resources::ImageId;

/// Background sprites skip collision detection entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layer {
    Background,
    #[default]
    Active,
}

/// Pending hit on a sprite. Set by the detector, consumed by the sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Collision {
    #[default]
    None,
    HitByWeapon,
    HitByProjectile,
    /// The sprite has reacted (or never reacts); the detector leaves it alone.
    Acknowledged,
}

/// Frame counter that fires once every `limit + 1` ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delay {
    pub limit: u16,
    pub current: u16,
}

impl Delay {
    pub const fn new(limit: u16) -> Self {
        Self { limit, current: 0 }
    }

    /// Counts one frame; returns true and restarts when the limit was reached.
    pub fn tick(&mut self) -> bool {
        let due = self.current >= self.limit;
        self.current = self.current.saturating_add(1);
        if due {
            self.current = 0;
        }
        due
    }

    /// Like [`tick`](Self::tick) but fires one frame later.
    pub fn tick_past(&mut self) -> bool {
        let due = self.current > self.limit;
        self.current = self.current.saturating_add(1);
        if due {
            self.current = 0;
        }
        due
    }

    pub fn is_due(&self) -> bool {
        self.current >= self.limit
    }
}

pub const ORDER_LEN: usize = 20;

#[derive(Clone, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub behavior: Behavior,
    pub layer: Layer,

    pub image: ImageId,
    pub frames: u16,
    pub w: i32,
    pub h: i32,
    pub frame: i32,
    pub show: bool,
    pub alpha: u8,

    pub x: f32,
    pub y: i32,
    pub z: f32,
    pub vel_x: f32,
    pub vel_y: i32,
    pub vel_y_cur: i32,
    pub gravity: i32,
    pub ground: i32,
    pub moving: bool,
    pub jumping: bool,
    pub facing: Facing,

    pub delay_x: Delay,
    pub delay_y: Delay,
    pub delay_frame: Delay,
    pub delay_hold: Delay,

    pub frame_index: i32,
    pub frame_count: i32,
    pub frame_order: [[u8; ORDER_LEN]; 2],

    pub weapon_active: bool,
    pub collision: Collision,
    pub collision_dir: Facing,
    /// Effect handed to the hero on contact; zero means "report contact only".
    pub damage: i16,
    pub hit_hero: bool,
    pub body: Bounds,
    pub weapon: Bounds,

    pub(crate) node: Option<NodeId>,
}

impl Sprite {
    pub fn new(kind: SpriteKind, image: ImageId, x: f32, y: i32, z: f32) -> Self {
        Self {
            kind,
            behavior: Behavior::Scenery { nudge: true },
            layer: Layer::Active,
            image,
            frames: 1,
            w: 0,
            h: 0,
            frame: 0,
            show: true,
            alpha: u8::MAX,
            x,
            y,
            z,
            vel_x: 0.0,
            vel_y: 0,
            vel_y_cur: 0,
            gravity: 0,
            ground: 0,
            moving: false,
            jumping: false,
            facing: Facing::Still,
            delay_x: Delay::default(),
            delay_y: Delay::default(),
            delay_frame: Delay::default(),
            delay_hold: Delay::default(),
            frame_index: 0,
            frame_count: 0,
            frame_order: [[0; ORDER_LEN]; 2],
            weapon_active: false,
            collision: Collision::None,
            collision_dir: Facing::Still,
            damage: -1,
            hit_hero: false,
            body: Bounds::default(),
            weapon: Bounds::default(),
            node: None,
        }
    }

    pub fn with_order(mut self, east: &[u8], west: &[u8]) -> Self {
        for (slot, frame) in self.frame_order[0].iter_mut().zip(east) {
            *slot = *frame;
        }
        for (slot, frame) in self.frame_order[1].iter_mut().zip(west) {
            *slot = *frame;
        }
        self
    }

    /// Sheet frame at `index` of the row for the current facing.
    pub fn frame_at(&self, index: i32) -> i32 {
        let index = index.clamp(0, ORDER_LEN as i32 - 1) as usize;
        i32::from(self.frame_order[self.facing.row()][index])
    }

    pub fn body_box(&self) -> Aabb {
        self.body.at(self.x as i32, self.y)
    }

    pub fn weapon_box(&self) -> Aabb {
        self.weapon.at(self.x as i32, self.y)
    }

    pub fn off_west(&self) -> bool {
        self.x < -(self.w as f32)
    }

    pub fn off_east(&self, config: &SimConfig) -> bool {
        self.x as i32 > config.exit_east
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}
