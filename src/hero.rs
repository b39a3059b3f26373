use crate::helpers::{Aabb, Bounds, Facing};

/// Where the hero's bat is in its swing. Only `Striking` damages sprites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeaponPhase {
    #[default]
    Idle,
    Windup,
    Striking,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeroState {
    pub x: f32,
    pub y: i32,
    pub facing: Facing,
    pub body: Bounds,
    pub weapon: WeaponPhase,
    /// Bat box for the current facing.
    pub weapon_bounds: Bounds,
}

impl HeroState {
    pub fn body_box(&self) -> Aabb {
        self.body.at(self.x as i32, self.y)
    }

    pub fn weapon_box(&self) -> Aabb {
        self.weapon_bounds.at(self.x as i32, self.y)
    }
}

pub trait HeroLink {
    fn state(&self) -> HeroState;

    /// A sprite's weapon touched the hero. Fire and forget.
    fn notify_hit(&mut self, damage: i16, dir: Facing);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeroHit {
    pub damage: i16,
    pub dir: Facing,
}

/// Minimal hero used by the demo and the tests.
///
/// A scripted sequence (knockback flight, level-complete run) can take the
/// controls with [`take_control`](Self::take_control); the player's facing
/// and weapon state are saved and handed back by
/// [`release_control`](Self::release_control), while the position the script
/// reached is kept.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHero {
    pub state: HeroState,
    pub hits: Vec<HeroHit>,
    saved: Option<HeroState>,
}

impl ScriptedHero {
    pub fn new(state: HeroState) -> Self {
        Self {
            state,
            hits: Vec::new(),
            saved: None,
        }
    }

    pub fn is_scripted(&self) -> bool {
        self.saved.is_some()
    }

    /// Saves the player-driven state and switches to `scripted`. Returns
    /// false (and changes nothing) if a script already holds the controls.
    pub fn take_control(&mut self, scripted: HeroState) -> bool {
        if self.saved.is_some() {
            return false;
        }
        self.saved = Some(self.state);
        self.state = scripted;
        true
    }

    pub fn release_control(&mut self) -> bool {
        let Some(saved) = self.saved.take() else {
            return false;
        };
        self.state = HeroState {
            x: self.state.x,
            y: self.state.y,
            ..saved
        };
        true
    }

    pub fn take_hits(&mut self) -> Vec<HeroHit> {
        std::mem::take(&mut self.hits)
    }
}

impl HeroLink for ScriptedHero {
    fn state(&self) -> HeroState {
        self.state
    }

    fn notify_hit(&mut self, damage: i16, dir: Facing) {
        self.hits.push(HeroHit { damage, dir });
    }
}
