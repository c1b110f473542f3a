// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    convert::Infallible,
    fmt,
    fmt::Display,
    io,
    io::Write,
};

use parking_lot::{
    MappedRwLockReadGuard,
    RwLock,
    RwLockReadGuard,
};
use tracing::instrument;

use crate::{
    config::SkipListConfig,
    errs::SkipListError,
    skiplist::{
        comparator::{
            Comparator,
            Natural,
        },
        level_generator::{
            GeometricalLevelGenerator,
            LevelGenerator,
        },
        node::{
            Arena,
            Node,
        },
    },
};

const DISPLAY_BEGIN: &str = "====================display list BEGIN====================";
const DISPLAY_END: &str = "=====================display list END=====================";

/// A position during a descent: either the header sentinel or a real node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Head,
    Node(usize),
}

/// Everything guarded by the list lock.
struct Inner<K, V> {
    /// The header sentinel's forward links, one per possible level.
    head: Box<[Option<usize>]>,
    arena: Arena<K, V>,
    /// Highest level currently in use.
    level: usize,
    len: usize,
    generator: GeometricalLevelGenerator,
}

impl<K, V> Inner<K, V> {
    #[inline]
    fn next(&self, at: Cursor, level: usize) -> Option<usize> {
        match at {
            | Cursor::Head => self.head[level],
            | Cursor::Node(idx) => self.arena[idx].next(level),
        }
    }

    #[inline]
    fn set_next(&mut self, at: Cursor, level: usize, link: Option<usize>) {
        match at {
            | Cursor::Head => self.head[level] = link,
            | Cursor::Node(idx) => self.arena[idx].set_next(level, link),
        }
    }

    /// Walk down from the current top level towards `key`, stepping forward
    /// while the next key is strictly less. The last position visited on each
    /// level is recorded into `update` when given. Returns the first node on
    /// level 0 whose key is not less than `key`.
    fn search<C: Comparator<K>>(
        &self,
        cmp: &C,
        key: &K,
        mut update: Option<&mut [Cursor]>,
    ) -> Option<usize> {
        let mut current = Cursor::Head;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next(current, level) {
                if !cmp.less(self.arena[next].key(), key) {
                    break;
                }
                current = Cursor::Node(next);
            }
            if let Some(update) = update.as_deref_mut() {
                update[level] = current;
            }
        }
        self.next(current, 0)
    }

    /// Like `search`, but only returns an exact match.
    fn lookup<C: Comparator<K>>(&self, cmp: &C, key: &K) -> Option<usize> {
        self.search(cmp, key, None)
            .filter(|&idx| cmp.equal(self.arena[idx].key(), key))
    }

    /// `lookup` that also records the predecessor on every level.
    fn lookup_with<C: Comparator<K>>(
        &self,
        cmp: &C,
        key: &K,
        update: &mut [Cursor],
    ) -> Option<usize> {
        self.search(cmp, key, Some(update))
            .filter(|&idx| cmp.equal(self.arena[idx].key(), key))
    }
}

/// An ordered map backed by a probabilistic skip list.
///
/// Nodes are stored in an arena and linked by slot index. A single
/// reader/writer lock guards the structure: lookups share it, while
/// [`insert`], [`remove`], [`update`] and [`clear`] hold it exclusively for
/// the whole descent and splice.
///
/// [`insert`]: SkipList::insert
/// [`remove`]: SkipList::remove
/// [`update`]: SkipList::update
/// [`clear`]: SkipList::clear
pub struct SkipList<K, V, C = Natural<K>> {
    inner: RwLock<Inner<K, V>>,
    cmp: C,
    max_level: usize,
    probability: f64,
}

impl<K: Ord, V> SkipList<K, V> {
    /// Create an empty list ordered by `K`'s [`Ord`] with the default
    /// configuration.
    pub fn new() -> Self {
        Self::build(SkipListConfig::default(), Natural::default())
    }

    /// Create an empty list ordered by `K`'s [`Ord`], failing if `config`
    /// does not validate.
    pub fn with_config(config: SkipListConfig) -> Result<Self, SkipListError> {
        Self::with_comparator(config, Natural::default())
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> SkipList<K, V, C> {
    /// Create an empty list whose order is given by `cmp`, a strict less-than.
    pub fn with_comparator(config: SkipListConfig, cmp: C) -> Result<Self, SkipListError> {
        config.validate()?;
        Ok(Self::build(config, cmp))
    }

    fn build(config: SkipListConfig, cmp: C) -> Self {
        let total = config.max_level() + 1;
        let generator = match config.seed() {
            | Some(seed) => GeometricalLevelGenerator::with_seed(total, config.probability(), seed),
            | None => GeometricalLevelGenerator::new(total, config.probability()),
        };

        SkipList {
            inner: RwLock::new(Inner {
                head: vec![None; total].into_boxed_slice(),
                arena: Arena::new(),
                level: 0,
                len: 0,
                generator,
            }),
            cmp,
            max_level: config.max_level(),
            probability: config.probability(),
        }
    }

    /// Highest level any node may reach.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Chance of promoting a node one level up.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Find the node holding `key`.
    ///
    /// The returned guard keeps the list read-locked until it is dropped, so
    /// writing to the same list from the same thread while holding it will
    /// deadlock.
    #[instrument(level = "trace", skip_all)]
    pub fn find(&self, key: &K) -> Option<MappedRwLockReadGuard<'_, Node<K, V>>> {
        let guard = self.inner.read();
        let idx = guard.lookup(&self.cmp, key)?;
        Some(RwLockReadGuard::map(guard, |inner| &inner.arena[idx]))
    }

    /// A copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.find(key).map(|node| node.value().clone())
    }

    /// Whether an entry for `key` exists.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().lookup(&self.cmp, key).is_some()
    }

    /// Insert `key` with `value` if the key is absent. Returns `false` and
    /// leaves the existing value untouched when the key is already present.
    #[instrument(level = "trace", skip_all)]
    pub fn insert(&self, key: K, value: V) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let mut update = vec![Cursor::Head; self.max_level + 1];
        if inner.lookup_with(&self.cmp, &key, &mut update).is_some() {
            return false;
        }

        let level = inner.generator.random();
        if level > inner.level {
            for slot in &mut update[inner.level + 1..=level] {
                *slot = Cursor::Head;
            }
            inner.level = level;
        }

        let idx = inner.arena.alloc(Node::new(key, value, level));
        for (i, &pred) in update.iter().enumerate().take(level + 1) {
            let next = inner.next(pred, i);
            inner.arena[idx].set_next(i, next);
            inner.set_next(pred, i, Some(idx));
        }

        inner.len += 1;
        true
    }

    /// Replace the value under an existing `key`, returning the previous one.
    /// Absent keys are left absent.
    #[instrument(level = "trace", skip_all)]
    pub fn update(&self, key: &K, value: V) -> Option<V> {
        let mut guard = self.inner.write();
        let idx = guard.lookup(&self.cmp, key)?;
        Some(guard.arena[idx].set_value(value))
    }

    /// Unlink and drop the node holding `key`, handing back its value.
    /// Removing an absent key is a no-op.
    #[instrument(level = "trace", skip_all)]
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let mut update = vec![Cursor::Head; self.max_level + 1];
        let target = inner.lookup_with(&self.cmp, key, &mut update)?;

        for (i, &pred) in update.iter().enumerate().take(inner.level + 1) {
            // higher levels never linked the target
            if inner.next(pred, i) != Some(target) {
                break;
            }
            let next = inner.arena[target].next(i);
            inner.set_next(pred, i, next);
        }

        while inner.level > 0 && inner.head[inner.level].is_none() {
            inner.level -= 1;
        }
        inner.len -= 1;

        Some(inner.arena.release(target).into_value())
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.inner.read().len
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Highest level currently in use.
    pub fn level(&self) -> usize {
        self.inner.read().level
    }

    #[instrument(level = "debug", skip_all)]
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.head.fill(None);
        inner.arena.clear();
        inner.level = 0;
        inner.len = 0;
    }

    /// Visit every entry in ascending key order under the read lock, stopping
    /// at the first error.
    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        let inner = self.inner.read();
        let mut link = inner.head[0];
        while let Some(idx) = link {
            let node = &inner.arena[idx];
            f(node.key(), node.value())?;
            link = node.next(0);
        }
        Ok(())
    }

    /// Visit every entry in ascending key order under the read lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let walked: Result<(), Infallible> = self.try_for_each(|key, value| {
            f(key, value);
            Ok(())
        });
        match walked {
            | Ok(()) => {},
            | Err(never) => match never {},
        }
    }

    /// Snapshot of all keys in order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(self.size());
        self.for_each(|key, _| keys.push(key.clone()));
        keys
    }

    /// Snapshot of all entries in order.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut entries = Vec::with_capacity(self.size());
        self.for_each(|key, value| entries.push((key.clone(), value.clone())));
        entries
    }

    /// Dump every level between BEGIN/END banners, top first, as `Level: n`
    /// followed by its `key:value;` chain.
    pub fn display_list<W: Write>(&self, out: &mut W) -> io::Result<()>
    where
        K: Display,
        V: Display,
    {
        let inner = self.inner.read();
        writeln!(out, "{DISPLAY_BEGIN}")?;
        for level in (0..=inner.level).rev() {
            writeln!(out, "Level: {level}")?;
            let mut link = inner.head[level];
            while let Some(idx) = link {
                let node = &inner.arena[idx];
                write!(out, "{}:{};  ", node.key(), node.value())?;
                link = node.next(level);
            }
            writeln!(out)?;
        }
        writeln!(out, "{DISPLAY_END}")?;
        Ok(())
    }

    /// Checks the structural invariants, panicking on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let inner = self.inner.read();
        assert!(inner.level <= self.max_level);

        if inner.level > 0 {
            assert!(inner.head[inner.level].is_some(), "current level {} is empty", inner.level);
        }

        // heights[h] counts level 0 nodes linked up to exactly level h
        let mut heights = vec![0usize; self.max_level + 1];
        let mut count = 0;
        let mut link = inner.head[0];
        while let Some(idx) = link {
            count += 1;
            let node = &inner.arena[idx];
            assert!(node.level() <= inner.level, "node above current level");
            heights[node.level()] += 1;
            if let Some(next) = node.next(0) {
                assert!(
                    self.cmp.less(node.key(), inner.arena[next].key()),
                    "level 0 out of order"
                );
            }
            link = node.next(0);
        }
        assert_eq!(count, inner.len);
        assert_eq!(inner.arena.len(), inner.len);

        for level in 1..=self.max_level {
            let mut link = inner.head[level];
            if level > inner.level {
                assert!(link.is_none(), "link above current level {level}");
            }
            let expected: usize = heights[level..].iter().sum();
            let mut linked = 0;
            while let Some(idx) = link {
                linked += 1;
                let node = &inner.arena[idx];
                assert!(node.level() >= level, "node linked above its height");
                if let Some(next) = node.next(level) {
                    assert!(self.cmp.less(node.key(), inner.arena[next].key()));
                }
                link = node.next(level);
            }
            assert_eq!(linked, expected, "level {level} is missing nodes");
        }
    }
}

impl<K, V, C> fmt::Debug for SkipList<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SkipList")
            .field("max_level", &self.max_level)
            .field("probability", &self.probability)
            .field("level", &inner.level)
            .field("len", &inner.len)
            .finish()
    }
}
