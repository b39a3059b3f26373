//! Depth-ordered draw list.
//!
//! Nodes live in an arena and link to each other by index. Two permanent
//! sentinels bracket the list: a head keyed at negative infinity and a tail
//! keyed at positive infinity. Traversal goes through one shared cursor so a
//! node may be removed while the cursor sits on it.

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Node<T> {
    key: f32,
    prev: usize,
    next: usize,
    generation: u32,
    payload: Option<T>,
}

pub struct DrawList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    cursor: usize,
    len: usize,
}

impl<T> Default for DrawList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DrawList<T> {
    pub fn new() -> Self {
        let head = Node {
            key: f32::NEG_INFINITY,
            prev: HEAD,
            next: TAIL,
            generation: 0,
            payload: None,
        };
        let tail = Node {
            key: f32::INFINITY,
            prev: HEAD,
            next: TAIL,
            generation: 0,
            payload: None,
        };
        Self {
            nodes: vec![head, tail],
            free: Vec::new(),
            cursor: HEAD,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links `payload` in front of the first node keyed strictly higher than
    /// `key`, so equal keys keep insertion order.
    pub fn insert(&mut self, key: f32, payload: T) -> NodeId {
        debug_assert!(!key.is_nan(), "draw key must be a number");
        let index = match self.free.pop() {
            Some(index) => {
                let node = &mut self.nodes[index];
                node.key = key;
                node.payload = Some(payload);
                index
            }
            None => {
                self.nodes.push(Node {
                    key,
                    prev: HEAD,
                    next: TAIL,
                    generation: 0,
                    payload: Some(payload),
                });
                self.nodes.len() - 1
            }
        };

        let mut at = self.nodes[HEAD].next;
        while at != TAIL && key >= self.nodes[at].key {
            at = self.nodes[at].next;
        }
        let before = self.nodes[at].prev;
        self.nodes[index].prev = before;
        self.nodes[index].next = at;
        self.nodes[before].next = index;
        self.nodes[at].prev = index;
        self.len += 1;

        NodeId {
            index: index as u32,
            generation: self.nodes[index].generation,
        }
    }

    fn resolve(&self, id: NodeId) -> Option<usize> {
        let index = id.index as usize;
        if index == HEAD || index == TAIL {
            return None;
        }
        let node = self.nodes.get(index)?;
        (node.generation == id.generation && node.payload.is_some()).then_some(index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        let index = self.resolve(id)?;
        self.nodes[index].payload.as_ref()
    }

    pub fn key(&self, id: NodeId) -> Option<f32> {
        self.resolve(id).map(|index| self.nodes[index].key)
    }

    /// Unlinks a node. If the cursor is on it, the cursor steps back to the
    /// previous node so the next [`advance`](Self::advance) lands on the
    /// removed node's successor. Stale ids are ignored.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let index = self.resolve(id)?;
        let (prev, next) = (self.nodes[index].prev, self.nodes[index].next);
        if self.cursor == index {
            self.cursor = prev;
        }
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let node = &mut self.nodes[index];
        node.generation = node.generation.wrapping_add(1);
        node.prev = HEAD;
        node.next = TAIL;
        self.free.push(index);
        self.len -= 1;
        node.payload.take()
    }

    /// Moves the cursor one node toward the tail. Reaching the tail rewinds
    /// the cursor to the head and returns `false`.
    pub fn advance(&mut self) -> bool {
        self.cursor = self.nodes[self.cursor].next;
        if self.cursor == TAIL {
            self.cursor = HEAD;
            return false;
        }
        true
    }

    pub fn current(&self) -> Option<(NodeId, &T)> {
        if self.cursor == HEAD || self.cursor == TAIL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        let payload = node.payload.as_ref()?;
        Some((
            NodeId {
                index: self.cursor as u32,
                generation: node.generation,
            },
            payload,
        ))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            at: self.nodes[HEAD].next,
        }
    }

    pub fn clear(&mut self) {
        let mut at = self.nodes[HEAD].next;
        while at != TAIL {
            let next = self.nodes[at].next;
            let node = &mut self.nodes[at];
            node.generation = node.generation.wrapping_add(1);
            node.payload = None;
            self.free.push(at);
            at = next;
        }
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.cursor = HEAD;
        self.len = 0;
    }
}

pub struct Iter<'a, T> {
    list: &'a DrawList<T>,
    at: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (f32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == TAIL {
            return None;
        }
        let node = &self.list.nodes[self.at];
        self.at = node.next;
        node.payload.as_ref().map(|payload| (node.key, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn drain<T: Copy>(list: &mut DrawList<T>) -> Vec<T> {
        let mut out = Vec::new();
        while list.advance() {
            if let Some((_, item)) = list.current() {
                out.push(*item);
            }
        }
        out
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut list = DrawList::new();
        list.insert(9.0, 'z');
        list.insert(5.0, 'a');
        list.insert(5.0, 'b');
        list.insert(1.0, 'q');
        assert_eq!(drain(&mut list), vec!['q', 'a', 'b', 'z']);
    }

    #[test]
    fn advance_rewinds_after_full_pass() {
        let mut list = DrawList::new();
        list.insert(1.0, 1);
        list.insert(2.0, 2);
        assert_eq!(drain(&mut list), vec![1, 2]);
        assert!(list.current().is_none());
        assert_eq!(drain(&mut list), vec![1, 2]);
    }

    #[test]
    fn removing_the_cursor_node_resumes_at_its_successor() {
        let mut list = DrawList::new();
        let ids: Vec<_> = (0..5).map(|i| list.insert(i as f32, i)).collect();
        let mut seen = Vec::new();
        while list.advance() {
            let Some((id, item)) = list.current() else { break };
            let item = *item;
            seen.push(item);
            if item == 2 {
                list.remove(id);
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(!list.contains(ids[2]));
        assert_eq!(drain(&mut list), vec![0, 1, 3, 4]);
    }

    #[test]
    fn stale_ids_are_ignored() {
        let mut list = DrawList::new();
        let first = list.insert(3.0, "first");
        assert_eq!(list.remove(first), Some("first"));
        let second = list.insert(3.0, "second");
        assert_eq!(list.remove(first), None);
        assert_eq!(list.get(second), Some(&"second"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_keeps_sentinels_usable() {
        let mut list = DrawList::new();
        let a = list.insert(1.0, 'a');
        list.insert(2.0, 'b');
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(a));
        list.insert(0.5, 'c');
        assert_eq!(drain(&mut list), vec!['c']);
    }

    #[test]
    fn random_churn_stays_sorted() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut list = DrawList::new();
        let mut live: Vec<NodeId> = Vec::new();
        for step in 0..4000u32 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let key = rng.gen_range(0..12) as f32 * 0.5;
                live.push(list.insert(key, step));
            } else {
                let victim = live.swap_remove(rng.gen_range(0..live.len()));
                assert!(list.remove(victim).is_some());
            }
            assert_eq!(list.len(), live.len());
        }
        let mut last = (f32::NEG_INFINITY, 0u32);
        for (key, step) in list.iter() {
            assert!(key >= last.0);
            if key == last.0 {
                assert!(*step > last.1, "equal keys out of insertion order");
            }
            last = (key, *step);
        }
        assert_eq!(list.iter().count(), live.len());
    }
}
