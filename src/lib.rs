//! Sprite simulation for a side-scrolling brawler: a fixed pool of sprites,
//! each driven by its own small state machine, drawn back to front from a
//! depth-ordered list and collided against the hero once per frame.

pub mod behavior;
pub mod collision;
pub mod config;
pub mod draw_list;
pub mod helpers;
pub mod hero;
pub mod pool;
pub mod registry;
pub mod render;
pub mod resources;
pub mod sprite;
pub mod world;

pub use behavior::{SpawnParams, SpawnRequest, SpriteKind};
pub use collision::{HeroBlockQuery, HeroBlockResult};
pub use config::{ConfigLoadError, SimConfig};
pub use helpers::{Aabb, Bounds, Facing};
pub use hero::{HeroLink, HeroState, ScriptedHero, WeaponPhase};
pub use pool::SpriteHandle;
pub use render::{Blit, Canvas};
pub use resources::{CatalogLoadError, ImageId, ImageLibrary, SheetCatalog, SoundCue};
pub use sprite::{Collision, Layer, Sprite};
pub use world::{Backdrop, DrawItem, ScreenshotText, SpriteWorld, WorldScroll};
