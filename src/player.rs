use macroquad::prelude::*;

use shelfstorm::{Bounds, Facing, HeroBlockQuery, HeroState, ScriptedHero, SpriteWorld, WeaponPhase};

const WIDTH: i32 = 60;
const HEIGHT: i32 = 90;
const WALK_SPEED: f32 = 3.0;
const JUMP_VELOCITY: i32 = -16;
const GRAVITY: i32 = 2;
const WINDUP_FRAMES: u32 = 4;
const STRIKE_FRAMES: u32 = 6;
const FLIGHT_FRAMES: u32 = 20;

/// Keyboard-driven hero for the demo. A/D walk, W jumps, J swings the bat.
///
/// Walking east past the midpoint scrolls the world instead of moving the
/// hero. Getting hit hands the controls to a short knockback flight.
pub struct Player {
    pub hero: ScriptedHero,
    vel_y: i32,
    floor: i32,
    swing: u32,
    flight: u32,
    hp: i32,
}

impl Player {
    pub fn new(x: f32, floor: i32) -> Self {
        let state = HeroState {
            x,
            y: floor,
            facing: Facing::East,
            body: Bounds::new(12, 4, WIDTH - 12, HEIGHT),
            weapon: WeaponPhase::Idle,
            weapon_bounds: bat_bounds(Facing::East),
        };
        Self {
            hero: ScriptedHero::new(state),
            vel_y: 0,
            floor,
            swing: 0,
            flight: 0,
            hp: 10,
        }
    }

    /// Moves the hero one frame and returns how far the world scrolls.
    pub fn update(&mut self, world: &SpriteWorld) -> f32 {
        self.take_hits();

        let mut step = 0.0;
        if self.hero.is_scripted() {
            self.flight = self.flight.saturating_sub(1);
            step = if self.hero.state.facing == Facing::East { WALK_SPEED } else { -WALK_SPEED };
            if self.flight == 0 {
                self.hero.release_control();
            }
        } else {
            if is_key_down(KeyCode::D) {
                step += WALK_SPEED;
                self.hero.state.facing = Facing::East;
            }
            if is_key_down(KeyCode::A) {
                step -= WALK_SPEED;
                self.hero.state.facing = Facing::West;
            }
            if is_key_pressed(KeyCode::W) && self.vel_y == 0 {
                self.vel_y = JUMP_VELOCITY;
            }
            if is_key_pressed(KeyCode::J) && self.swing == 0 {
                self.swing = WINDUP_FRAMES + STRIKE_FRAMES;
            }
        }
        self.advance_swing();

        let state = &mut self.hero.state;
        let midpoint = world.config().hero_midpoint_east as f32;
        let mut x = (state.x + step).max(0.0);
        let mut scroll = 0.0;
        if x > midpoint {
            scroll = x - midpoint;
            x = midpoint;
        }

        let blocked = world.resolve_hero(HeroBlockQuery {
            x,
            y: state.y,
            width: WIDTH,
            body: state.body,
            scroll,
        });
        state.x = blocked.x;
        let ground = blocked.ground.unwrap_or(self.floor);

        if self.vel_y != 0 || state.y < ground {
            state.y += self.vel_y;
            self.vel_y += GRAVITY;
            if state.y >= ground {
                state.y = ground;
                self.vel_y = 0;
            }
        } else {
            state.y = ground;
        }
        blocked.scroll
    }

    fn advance_swing(&mut self) {
        let state = &mut self.hero.state;
        state.weapon_bounds = bat_bounds(state.facing);
        state.weapon = match self.swing {
            0 => WeaponPhase::Idle,
            n if n > STRIKE_FRAMES => WeaponPhase::Windup,
            _ => WeaponPhase::Striking,
        };
        self.swing = self.swing.saturating_sub(1);
    }

    fn take_hits(&mut self) {
        for hit in self.hero.take_hits() {
            self.hp = (self.hp + i32::from(hit.damage)).max(0);
            if hit.dir == Facing::Still || self.hero.is_scripted() {
                continue;
            }
            let flight = HeroState {
                facing: hit.dir,
                weapon: WeaponPhase::Idle,
                ..self.hero.state
            };
            if self.hero.take_control(flight) {
                self.flight = FLIGHT_FRAMES;
                self.swing = 0;
                self.vel_y = JUMP_VELOCITY / 2;
            }
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn draw(&self) {
        let state = &self.hero.state;
        let body = state.body_box().to_rect();
        let color = if self.hero.is_scripted() { ORANGE } else { SKYBLUE };
        draw_rectangle(body.x, body.y, body.w, body.h, color);
        if state.weapon != WeaponPhase::Idle {
            let bat = state.weapon_box().to_rect();
            let color = if state.weapon == WeaponPhase::Striking { RED } else { BROWN };
            draw_rectangle(bat.x, bat.y, bat.w, bat.h, color);
        }
    }
}

fn bat_bounds(facing: Facing) -> Bounds {
    match facing {
        Facing::West => Bounds::new(-30, 20, 12, 50),
        _ => Bounds::new(WIDTH - 12, 20, WIDTH + 30, 50),
    }
}
