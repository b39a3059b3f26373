use crate::config::SimConfig;
use crate::pool::SpriteHandle;

#[derive(Clone, Debug)]
pub struct Registry {
    name: &'static str,
    slots: Vec<Option<SpriteHandle>>,
}

impl Registry {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            slots: vec![None; capacity],
        }
    }

    /// Puts `handle` in the first open slot. Adding a member twice keeps the
    /// original slot. `None` when the registry is full.
    pub fn add(&mut self, handle: SpriteHandle) -> Option<usize> {
        if let Some(index) = self.position(handle) {
            return Some(index);
        }
        let Some(index) = self.slots.iter().position(Option::is_none) else {
            log::debug!("{} registry full, sprite {} not added", self.name, handle.index());
            return None;
        };
        self.slots[index] = Some(handle);
        Some(index)
    }

    pub fn remove(&mut self, handle: SpriteHandle) -> bool {
        match self.position(handle) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    fn position(&self, handle: SpriteHandle) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(handle))
    }

    pub fn contains(&self, handle: SpriteHandle) -> bool {
        self.position(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteHandle> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

#[derive(Clone, Debug)]
pub struct Registries {
    pub blockers: Registry,
    pub projectiles: Registry,
    pub blinkers: Registry,
}

impl Registries {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            blockers: Registry::new("blocker", config.max_blockers),
            projectiles: Registry::new("projectile", config.max_projectiles),
            blinkers: Registry::new("blinker", config.max_blinkers),
        }
    }

    pub fn forget(&mut self, handle: SpriteHandle) {
        self.blockers.remove(handle);
        self.projectiles.remove(handle);
        self.blinkers.remove(handle);
    }

    pub fn clear(&mut self) {
        self.blockers.clear();
        self.projectiles.clear();
        self.blinkers.clear();
    }
}
