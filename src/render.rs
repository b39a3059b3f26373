use std::collections::HashMap;

use macroquad::color::{Color, WHITE};
use macroquad::math::{Rect, vec2};
use macroquad::shapes::draw_rectangle;
use macroquad::texture::{DrawTextureParams, FilterMode, Texture2D, draw_texture_ex, load_texture};

use crate::resources::{ImageId, SheetCatalog};
use crate::sprite::Sprite;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blit {
    pub image: ImageId,
    pub src: Rect,
    pub x: f32,
    pub y: f32,
    pub alpha: u8,
}

/// Draw call for `sprite`, clipped to the screen's west and east edges.
/// `None` for hidden sprites and sprites entirely off screen.
pub fn blit_for(sprite: &Sprite, screen_width: i32) -> Option<Blit> {
    let x = sprite.x as i32;
    if !sprite.show || x + sprite.w < 0 || x > screen_width {
        return None;
    }

    let mut src = Rect::new(0.0, (sprite.frame * sprite.h) as f32, sprite.w as f32, sprite.h as f32);
    let mut dest_x = x as f32;
    if x < 0 {
        src.x = -x as f32;
        src.w = (sprite.w + x) as f32;
        dest_x = 0.0;
    } else if x + sprite.w > screen_width {
        src.w = (screen_width - x + 1) as f32;
    }

    Some(Blit {
        image: sprite.image,
        src,
        x: dest_x,
        y: sprite.y as f32,
        alpha: sprite.alpha,
    })
}

pub trait Canvas {
    fn blit(&mut self, blit: &Blit);

    /// A non-sprite draw-list node (hero, power meter) came up in depth order.
    fn overlay(&mut self, tag: u32);
}

/// Sheet textures drawn through macroquad.
///
/// Sheets without a texture show as flat placeholder boxes so a level can be
/// laid out before its art exists. Overlays have nothing to draw here; wrap
/// the canvas to draw them.
#[derive(Default)]
pub struct TextureCanvas {
    textures: HashMap<ImageId, Texture2D>,
}

impl TextureCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every texture the catalog names. Missing files are logged and
    /// fall back to placeholders.
    pub async fn load(catalog: &SheetCatalog) -> Self {
        let mut canvas = Self::new();
        for (id, entry) in catalog.iter() {
            let Some(path) = entry.texture.as_deref() else {
                continue;
            };
            match load_texture(path).await {
                Ok(tex) => {
                    tex.set_filter(FilterMode::Nearest);
                    canvas.textures.insert(id, tex);
                }
                Err(err) => log::warn!("texture {path} for image {} not loaded: {err}", id.0),
            }
        }
        canvas
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn draw(&self, blit: &Blit) {
        match self.textures.get(&blit.image) {
            Some(tex) => {
                let tint = Color {
                    a: f32::from(blit.alpha) / 255.0,
                    ..WHITE
                };
                draw_texture_ex(
                    tex,
                    blit.x,
                    blit.y,
                    tint,
                    DrawTextureParams {
                        source: Some(blit.src),
                        dest_size: Some(vec2(blit.src.w, blit.src.h)),
                        ..Default::default()
                    },
                );
            }
            None => draw_rectangle(blit.x, blit.y, blit.src.w, blit.src.h, placeholder_color(blit.image, blit.alpha)),
        }
    }
}

fn placeholder_color(image: ImageId, alpha: u8) -> Color {
    let hue = u32::from(image.0).wrapping_mul(2_654_435_761);
    Color::from_rgba((hue >> 24) as u8 | 0x40, (hue >> 16) as u8 | 0x40, (hue >> 8) as u8 | 0x40, alpha / 2)
}

impl Canvas for TextureCanvas {
    fn blit(&mut self, blit: &Blit) {
        self.draw(blit);
    }

    fn overlay(&mut self, tag: u32) {
        log::trace!("overlay {tag} has no drawer");
    }
}
