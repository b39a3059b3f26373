use macroquad::prelude::*;

mod player;

use player::Player;
use shelfstorm::helpers;
use shelfstorm::render::TextureCanvas;
use shelfstorm::{
    Blit, Canvas, Facing, HeroLink, ImageId, Layer, ScreenshotText, SheetCatalog, SimConfig, SpawnParams,
    SpriteWorld, WeaponPhase, WorldScroll,
};

const CONFIG_PATH: &str = "shelfstorm.yaml";
const SHEETS_PATH: &str = "assets/sheets.json";
const SCREENSHOT_PATH: &str = "screenshot.png";
const HERO_TAG: u32 = 1;
const HERO_DEPTH: f32 = 7.0;
const IDLE_FRAMES: u32 = 600;
const LEVEL_LENGTH: f32 = 2400.0;

/// One sprite of the demo level, placed at an absolute world x.
struct Placement {
    world_x: f32,
    id: ImageId,
    y: i32,
    z: f32,
    layer: Layer,
    params: SpawnParams,
}

fn placement(world_x: f32, id: ImageId, y: i32, z: f32, layer: Layer, params: SpawnParams) -> Placement {
    Placement {
        world_x,
        id,
        y,
        z,
        layer,
        params,
    }
}

fn demo_level() -> Vec<Placement> {
    vec![
        placement(120.0, ImageId::RANDOM_SHELF, 22, 1.0, Layer::Background, SpawnParams::None),
        placement(300.0, ImageId::FALLING_SHELF, 22, 3.0, Layer::Active, SpawnParams::None),
        placement(520.0, ImageId::POWER_UP, 200, 6.0, Layer::Active, SpawnParams::None),
        placement(700.0, ImageId::TENT_GREEN, 152, 4.0, Layer::Active, SpawnParams::Facing(Facing::West)),
        placement(900.0, ImageId::BOWLING_SHELF, 140, 2.0, Layer::Active, SpawnParams::None),
        placement(1100.0, ImageId::ARCHER, 0, 5.0, Layer::Active, SpawnParams::None),
        placement(
            1300.0,
            ImageId::SERIES,
            0,
            9.0,
            Layer::Active,
            SpawnParams::Series {
                id: ImageId::BASKETBALL,
                count: 4,
                interval: 40,
            },
        ),
        placement(1500.0, ImageId::GRILL, 0, 5.0, Layer::Active, SpawnParams::None),
        placement(1700.0, ImageId::PUNCHING_BAG, 0, 5.0, Layer::Active, SpawnParams::None),
        placement(1900.0, ImageId::ANY_BICYCLE, 0, 6.0, Layer::Active, SpawnParams::None),
        placement(2100.0, ImageId::TENT_BLUE, 152, 4.0, Layer::Background, SpawnParams::None),
    ]
}

/// Draws sprites from their sheets and the hero where the draw list puts it.
struct Frame<'a> {
    sheets: &'a TextureCanvas,
    player: &'a Player,
}

impl Canvas for Frame<'_> {
    fn blit(&mut self, blit: &Blit) {
        self.sheets.draw(blit);
    }

    fn overlay(&mut self, tag: u32) {
        if tag == HERO_TAG {
            self.player.draw();
        }
    }
}

fn window_conf() -> Conf {
    let config = load_config();
    Conf {
        window_title: "shelfstorm".to_owned(),
        window_width: config.screen_width * 2,
        window_height: config.screen_height * 2,
        sample_count: 1,
        ..Default::default()
    }
}

fn load_config() -> SimConfig {
    if !std::path::Path::new(CONFIG_PATH).exists() {
        return SimConfig::default();
    }
    SimConfig::load(CONFIG_PATH).unwrap_or_else(|err| {
        log::warn!("config load failed: {err}");
        SimConfig::default()
    })
}

fn load_sheets() -> SheetCatalog {
    if !std::path::Path::new(SHEETS_PATH).exists() {
        log::info!("{SHEETS_PATH} not found, using stock sheet sizes");
        return SheetCatalog::builtin();
    }
    SheetCatalog::load(SHEETS_PATH).unwrap_or_else(|err| {
        log::warn!("sheet catalog load failed: {err}");
        SheetCatalog::builtin()
    })
}

fn draw_hitboxes(world: &SpriteWorld, player: &Player) {
    for handle in world.active_handles() {
        let Some(sprite) = world.sprite(handle) else {
            continue;
        };
        if sprite.layer == Layer::Background {
            continue;
        }
        helpers::draw_hitbox(sprite.body_box(), GREEN);
        if sprite.weapon_active {
            helpers::draw_hitbox(sprite.weapon_box(), RED);
        }
    }
    let hero = player.hero.state();
    helpers::draw_hitbox(hero.body_box(), YELLOW);
    if hero.weapon == WeaponPhase::Striking {
        helpers::draw_hitbox(hero.weapon_box(), RED);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    let sheets = load_sheets();
    let textures = TextureCanvas::load(&sheets).await;
    log::info!("{} sheet textures loaded", textures.texture_count());

    let floor = config.screen_height - 90 - config.ground_margin;
    let screen_w = config.screen_width as f32;
    let screen_h = config.screen_height as f32;
    let mut world = SpriteWorld::new(config, Box::new(sheets));
    let mut player = Player::new(60.0, floor);
    world.attach_overlay(HERO_DEPTH, HERO_TAG);

    let mut level = demo_level();
    level.sort_by(|a, b| a.world_x.total_cmp(&b.world_x));
    let mut next_placement = 0;
    let mut scroll = WorldScroll::default();
    let mut idle = 0u32;
    let mut level_done = false;

    let camera = Camera2D::from_display_rect(Rect::new(0.0, screen_h, screen_w, -screen_h));

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) {
            world.destroy_all();
            scroll = WorldScroll::default();
            next_placement = 0;
            level_done = false;
            player = Player::new(60.0, floor);
        }

        // Level entries enter just past the east edge.
        while let Some(entry) = level.get(next_placement) {
            if entry.world_x > scroll.offset + screen_w {
                break;
            }
            world.spawn_at_world(entry.world_x, entry.y, entry.z, entry.id, entry.layer, entry.params, &scroll);
            next_placement += 1;
        }

        world.detect_collisions(&mut player.hero);
        let before = player.hero.state();
        let delta = player.update(&world);
        scroll.advance(delta);
        world.update_all(delta, &player.hero.state());

        if before.x == player.hero.state.x && delta == 0.0 {
            idle += 1;
            if idle >= IDLE_FRAMES {
                idle = 0;
                world.create_random_sprite();
            }
        } else {
            idle = 0;
        }

        if !level_done && scroll.offset >= LEVEL_LENGTH {
            level_done = true;
            world.create_level_complete_text(0);
        }

        for cue in world.drain_sounds() {
            log::debug!("sound {cue:?}");
        }

        set_camera(&camera);
        clear_background(Color::from_hex(0x2b2b3a));
        draw_rectangle(0.0, (floor + 90) as f32, screen_w, screen_h, DARKGRAY);
        world.draw_all(&mut Frame {
            sheets: &textures,
            player: &player,
        });
        if is_key_down(KeyCode::H) {
            draw_hitboxes(&world, &player);
        }
        set_default_camera();
        draw_text(&format!("HP {}", player.hp()), 12.0, 24.0, 24.0, WHITE);

        if is_key_pressed(KeyCode::P) {
            world.create_screenshot_text(ScreenshotText::Capturing);
            world.show_blink_sprites();
            get_screen_data().export_png(SCREENSHOT_PATH);
            world.destroy_screenshot_text();
            world.create_screenshot_text(ScreenshotText::Saved);
            log::info!("screenshot saved to {SCREENSHOT_PATH}");
        }

        next_frame().await;
    }
}
