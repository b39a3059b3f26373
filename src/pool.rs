use crate::sprite::Sprite;

/// Reference to a pool slot, tagged with the slot's generation so that a
/// handle kept past its sprite's lifetime can be recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    index: u32,
    generation: u32,
}

impl SpriteHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

struct Slot {
    generation: u32,
    free: bool,
    /// `None` on a live slot only while its sprite is checked out for update.
    sprite: Option<Sprite>,
}

pub struct SpritePool {
    slots: Vec<Slot>,
    live: usize,
}

impl SpritePool {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                free: true,
                sprite: None,
            })
            .collect();
        Self { slots, live: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn count_active(&self) -> usize {
        self.live
    }

    pub fn has_free_slot(&self) -> bool {
        self.live < self.slots.len()
    }

    /// Stores `sprite` in the lowest free slot. `None` when the pool is full.
    pub fn allocate(&mut self, sprite: Sprite) -> Option<SpriteHandle> {
        let index = self.slots.iter().position(|slot| slot.free)?;
        let slot = &mut self.slots[index];
        slot.free = false;
        slot.sprite = Some(sprite);
        self.live += 1;
        Some(SpriteHandle {
            index: index as u32,
            generation: slot.generation,
        })
    }

    fn slot(&self, handle: SpriteHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index())
            .filter(|slot| !slot.free && slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: SpriteHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| !slot.free && slot.generation == handle.generation)
    }

    pub fn is_live(&self, handle: SpriteHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Releases the slot. Returns the sprite, or `None` if the handle is stale
    /// or already freed.
    pub fn free(&mut self, handle: SpriteHandle) -> Option<Sprite> {
        let slot = self.slot_mut(handle)?;
        slot.free = true;
        slot.generation = slot.generation.wrapping_add(1);
        let sprite = slot.sprite.take();
        self.live -= 1;
        sprite
    }

    pub fn get(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.slot(handle)?.sprite.as_ref()
    }

    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut Sprite> {
        self.slot_mut(handle)?.sprite.as_mut()
    }

    pub fn handle_at(&self, index: usize) -> Option<SpriteHandle> {
        let slot = self.slots.get(index)?;
        (!slot.free).then_some(SpriteHandle {
            index: index as u32,
            generation: slot.generation,
        })
    }

    pub fn handles(&self) -> impl Iterator<Item = SpriteHandle> + '_ {
        (0..self.slots.len()).filter_map(|index| self.handle_at(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteHandle, &Sprite)> + '_ {
        self.handles()
            .filter_map(|handle| self.get(handle).map(|sprite| (handle, sprite)))
    }

    /// Checks a sprite out of its slot; the slot stays allocated.
    pub fn take(&mut self, handle: SpriteHandle) -> Option<Sprite> {
        self.slot_mut(handle)?.sprite.take()
    }

    /// Returns a sprite checked out with [`take`](Self::take).
    pub fn restore(&mut self, handle: SpriteHandle, sprite: Sprite) {
        match self.slot_mut(handle) {
            Some(slot) => {
                debug_assert!(slot.sprite.is_none(), "restoring over a live sprite");
                slot.sprite = Some(sprite);
            }
            None => log::debug!("dropping sprite for released slot {}", handle.index()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::SpriteKind;
    use crate::resources::ImageId;

    fn sprite(x: f32) -> Sprite {
        Sprite::new(SpriteKind::Scenery, ImageId(59), x, 0, 1.0)
    }

    #[test]
    fn allocates_lowest_free_slot() {
        let mut pool = SpritePool::new(3);
        let a = pool.allocate(sprite(1.0)).expect("a");
        let b = pool.allocate(sprite(2.0)).expect("b");
        assert_eq!((a.index(), b.index()), (0, 1));
        pool.free(a);
        let c = pool.allocate(sprite(3.0)).expect("c");
        assert_eq!(c.index(), 0);
        assert_ne!(a, c);
    }

    #[test]
    fn full_pool_refuses() {
        let mut pool = SpritePool::new(2);
        assert!(pool.allocate(sprite(0.0)).is_some());
        assert!(pool.allocate(sprite(0.0)).is_some());
        assert!(!pool.has_free_slot());
        assert!(pool.allocate(sprite(0.0)).is_none());
        assert_eq!(pool.count_active(), 2);
    }

    #[test]
    fn free_is_idempotent_and_stale_handles_miss() {
        let mut pool = SpritePool::new(2);
        let a = pool.allocate(sprite(5.0)).expect("a");
        assert!(pool.free(a).is_some());
        assert!(pool.free(a).is_none());
        assert_eq!(pool.count_active(), 0);
        let b = pool.allocate(sprite(6.0)).expect("b");
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(b).map(|s| s.x), Some(6.0));
    }

    #[test]
    fn take_and_restore_keep_the_slot() {
        let mut pool = SpritePool::new(2);
        let a = pool.allocate(sprite(5.0)).expect("a");
        let mut taken = pool.take(a).expect("take");
        assert!(pool.is_live(a));
        assert!(pool.get(a).is_none());
        assert!(pool.allocate(sprite(0.0)).map(|h| h.index()) == Some(1));
        taken.x = 9.0;
        pool.restore(a, taken);
        assert_eq!(pool.get(a).map(|s| s.x), Some(9.0));
    }

    #[test]
    fn handles_walk_slot_order() {
        let mut pool = SpritePool::new(4);
        let handles: Vec<_> = (0..4).filter_map(|i| pool.allocate(sprite(i as f32))).collect();
        pool.free(handles[1]);
        let order: Vec<usize> = pool.handles().map(|h| h.index()).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }
}
