use macroquad::color::Color;
use macroquad::math::Rect;
use macroquad::shapes::draw_rectangle_lines;
use rand::Rng;
use rand::rngs::StdRng;

/// Horizontal heading of a sprite (or of the hero).
///
/// `Still` is used by sprites that never move east or west; a hero hit by
/// such a sprite is not thrown in any particular direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Still,
    East,
    West,
}

impl Facing {
    /// Row of a two-row animation table (east first, west second).
    pub fn row(self) -> usize {
        match self {
            Self::West => 1,
            _ => 0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Still => Self::Still,
        }
    }

    pub fn from_velocity(vel: f32) -> Self {
        if vel > 0.0 { Self::East } else { Self::West }
    }

    /// Collapses anything that is not `East` onto `West`.
    pub fn east_or_west(self) -> Self {
        if self == Self::East { Self::East } else { Self::West }
    }
}

/// Bounding box stored relative to a sprite's position, in min/max form.
///
/// `right` and `bottom` are offsets of the far edges, not a width and height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn at(&self, x: i32, y: i32) -> Aabb {
        Aabb {
            min_x: x + self.left,
            min_y: y + self.top,
            max_x: x + self.right,
            max_y: y + self.bottom,
        }
    }
}

/// Absolute axis-aligned box with inclusive edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aabb {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Aabb {
    pub fn mid_x(&self) -> i32 {
        self.min_x + (self.max_x - self.min_x) / 2
    }

    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        !(other.min_x > self.max_x || other.max_x < self.min_x)
    }

    /// Closed-interval overlap: shared edges and corners count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && !(other.min_y > self.max_y || other.max_y < self.min_y)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.min_x as f32,
            self.min_y as f32,
            (self.max_x - self.min_x) as f32,
            (self.max_y - self.min_y) as f32,
        )
    }
}

/// Inclusive random integer in `lower..=upper`.
pub fn random_range(rng: &mut StdRng, lower: i32, upper: i32) -> i32 {
    if upper <= lower {
        return lower;
    }
    rng.gen_range(lower..=upper)
}

pub fn draw_hitbox(aabb: Aabb, color: Color) {
    let rect = aabb.to_rect();
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, color);
}
