//! A skiplist implementation which allows faster random access than a standard
//! linked list.
//!
//! SkipLists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `n > 0` will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level `n` is `p` times the chance of occupying level `n-1`
//! (with `0 < p < 1`).
//!
//! Searching starts at the highest level in use and moves forward while the
//! next key is smaller than the target, dropping one level whenever it cannot
//! go further. Insertion and removal share that descent, remembering the last
//! node visited on every level so the new node can be spliced in (or the old
//! one spliced out) behind it.

mod comparator;
mod level_generator;
mod list;
mod node;

pub use comparator::{
    Comparator,
    Natural,
};
pub use level_generator::{
    GeometricalLevelGenerator,
    LevelGenerator,
};
pub use list::SkipList;
pub use node::Node;
