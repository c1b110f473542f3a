use std::{
    mem,
    ops::{
        Index,
        IndexMut,
    },
};

/// A single entry in the list, linked forward on levels `0..=level()`.
#[derive(Debug)]
pub struct Node<K, V> {
    key: K,
    value: V,
    /// `forward[i]` is the arena slot of the next node on level `i`.
    forward: Box<[Option<usize>]>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, level: usize) -> Self {
        Node {
            key,
            value,
            forward: vec![None; level + 1].into_boxed_slice(),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Replace the value, returning the old one. The key never changes.
    pub fn set_value(&mut self, value: V) -> V {
        mem::replace(&mut self.value, value)
    }

    /// The highest level this node is linked on.
    pub fn level(&self) -> usize {
        self.forward.len() - 1
    }

    #[inline]
    pub(crate) fn next(&self, level: usize) -> Option<usize> {
        self.forward[level]
    }

    #[inline]
    pub(crate) fn set_next(&mut self, level: usize, link: Option<usize>) {
        self.forward[level] = link;
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}

/// Slot storage for nodes. Links between nodes are slot indices, so a node
/// can be referenced from several predecessors while the arena stays the
/// single owner.
#[derive(Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            | Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            },
            | None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            },
        }
    }

    /// Take the node out of its slot. The slot is reused by a later `alloc`.
    pub(crate) fn release(&mut self, idx: usize) -> Node<K, V> {
        match self.slots[idx].take() {
            | Some(node) => {
                self.free.push(idx);
                node
            },
            | None => unreachable!("released an empty slot {idx}"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<K, V> Index<usize> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, idx: usize) -> &Self::Output {
        match &self.slots[idx] {
            | Some(node) => node,
            | None => unreachable!("dangling link to slot {idx}"),
        }
    }
}

impl<K, V> IndexMut<usize> for Arena<K, V> {
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        match &mut self.slots[idx] {
            | Some(node) => node,
            | None => unreachable!("dangling link to slot {idx}"),
        }
    }
}
