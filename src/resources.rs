use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u16);

impl ImageId {
    pub const BOMB: Self = Self(4);
    pub const EMPLOYEE: Self = Self(5);
    pub const BASKETBALL: Self = Self(6);
    pub const BASEBALL: Self = Self(7);
    pub const SOCCERBALL: Self = Self(8);
    pub const GRILL: Self = Self(9);
    pub const TENT_GUY: Self = Self(10);
    pub const PUNCHING_BAG: Self = Self(11);
    pub const RANDOM_SHELF: Self = Self(12);
    pub const SHELF_B: Self = Self(13);
    pub const SHELF_C: Self = Self(14);
    pub const SHELF_D: Self = Self(15);
    pub const FALLING_SHELF: Self = Self(16);
    pub const POWER_UP: Self = Self(18);
    pub const TWINKLE: Self = Self(19);
    pub const LEVEL_COMPLETE_TEXT: Self = Self(31);
    pub const SCREENSHOT_TEXT: Self = Self(32);
    pub const SCREENSHOT_DONE_TEXT: Self = Self(33);
    pub const BOWLING_SHELF: Self = Self(41);
    pub const RED_BOWLING_BALL: Self = Self(42);
    pub const BLUE_BOWLING_BALL: Self = Self(45);
    pub const TENT_GREEN: Self = Self(50);
    pub const TENT_BLUE: Self = Self(55);
    pub const ARCHER: Self = Self(56);
    pub const ARROW: Self = Self(57);
    pub const BOUNCE_BOMB: Self = Self(58);
    pub const BICYCLE: Self = Self(60);
    pub const BICYCLE_WHEELIE: Self = Self(61);
    pub const BONUS_LIFE: Self = Self(64);
    /// Not a sheet: asks for a randomly chosen bicycle.
    pub const ANY_BICYCLE: Self = Self(100);
    /// Not a sheet: the invisible series spawner.
    pub const SERIES: Self = Self(101);
}

/// Number of alternative rows stacked in each shelf layer sheet.
pub const SHELF_SETS: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    BallHit,
    GrillFalling,
    BowlingBallFall,
    PowerUp,
    ShelfFall,
    TentHit,
    Screenshot,
    EmployeeHit,
    Explosion,
    Arrow,
    Bicycle,
    BicycleBell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: i32,
    pub height: i32,
    /// Frames stacked vertically in the sheet, as declared by the pack.
    pub frames: u16,
}

impl ImageInfo {
    pub fn frame_height(&self, frames: u16) -> i32 {
        self.height / i32::from(frames.max(1))
    }
}

pub trait ImageLibrary {
    fn image(&self, id: ImageId) -> Option<ImageInfo>;

    fn image_width(&self, id: ImageId) -> i32 {
        self.image(id).map(|info| info.width).unwrap_or(0)
    }
}

#[derive(Debug)]
pub enum CatalogLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Duplicate(ImageId),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Duplicate(id) => write!(f, "image {} declared twice", id.0),
        }
    }
}

impl std::error::Error for CatalogLoadError {}

impl From<std::io::Error> for CatalogLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Clone, Debug)]
pub struct SheetEntry {
    pub info: ImageInfo,
    pub texture: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SheetCatalog {
    entries: HashMap<ImageId, SheetEntry>,
}

impl SheetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        let mut catalog = Self::new();
        for sheet in file.sheets {
            if catalog.entries.contains_key(&sheet.id) {
                return Err(CatalogLoadError::Duplicate(sheet.id));
            }
            catalog.entries.insert(
                sheet.id,
                SheetEntry {
                    info: ImageInfo {
                        width: sheet.width,
                        height: sheet.height,
                        frames: sheet.frames,
                    },
                    texture: sheet.texture,
                },
            );
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, id: ImageId, width: i32, height: i32, frames: u16) {
        self.entries.insert(
            id,
            SheetEntry {
                info: ImageInfo { width, height, frames },
                texture: None,
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &SheetEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Catalog of the stock sheet sizes, for running without a sheet file.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        let sheets: &[(u16, i32, i32, u16)] = &[
            (4, 56, 16 * 48, 16),
            (5, 64, 10 * 96, 10),
            (6, 32, 10 * 32, 10),
            (7, 24, 5 * 24, 5),
            (8, 32, 10 * 32, 10),
            (9, 96, 10 * 128, 10),
            (10, 128, 12 * 112, 12),
            (11, 60, 11 * 160, 11),
            (12, 120, 10 * 40, 10),
            (13, 120, 10 * 40, 10),
            (14, 120, 10 * 40, 10),
            (15, 120, 10 * 40, 10),
            (16, 160, 11 * 240, 11),
            (18, 24, 6 * 24, 6),
            (19, 32, 3 * 32, 3),
            (31, 240, 2 * 40, 2),
            (32, 220, 30, 1),
            (33, 220, 30, 1),
            (41, 120, 40, 1),
            (42, 24, 7 * 36, 7),
            (43, 24, 7 * 36, 7),
            (44, 24, 7 * 36, 7),
            (45, 24, 7 * 36, 7),
            (50, 100, 2 * 110, 2),
            (51, 100, 2 * 110, 2),
            (52, 100, 2 * 110, 2),
            (53, 100, 2 * 110, 2),
            (54, 100, 2 * 110, 2),
            (55, 100, 2 * 110, 2),
            (56, 96, 24 * 100, 24),
            (57, 40, 2 * 8, 2),
            (59, 80, 60, 1),
            (60, 90, 4 * 70, 4),
            (61, 90, 4 * 80, 4),
            (64, 24, 24, 1),
        ];
        for &(id, width, height, frames) in sheets {
            catalog.insert(ImageId(id), width, height, frames);
        }
        catalog
    }
}

impl ImageLibrary for SheetCatalog {
    fn image(&self, id: ImageId) -> Option<ImageInfo> {
        self.entries.get(&id).map(|entry| entry.info)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    sheets: Vec<SheetFile>,
}

#[derive(Deserialize)]
struct SheetFile {
    id: ImageId,
    width: i32,
    height: i32,
    #[serde(default = "default_frames")]
    frames: u16,
    #[serde(default)]
    texture: Option<String>,
}

fn default_frames() -> u16 {
    1
}
