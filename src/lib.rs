//! An ordered key-value container built on a probabilistic [`skip list`],
//! with whole-list binary persistence.
//!
//! ```
//! use cesium_skiplist::SkipList;
//!
//! let list = SkipList::<u32, String>::new();
//! assert!(list.insert(30, "value-30".to_string()));
//! assert!(list.insert(70, "value-70".to_string()));
//! assert!(!list.insert(30, "again".to_string()));
//!
//! assert_eq!(list.get(&30).as_deref(), Some("value-30"));
//! assert!(list.find(&50).is_none());
//!
//! list.remove(&30);
//! assert_eq!(list.size(), 1);
//! ```
//!
//! [`skip list`]: https://en.wikipedia.org/wiki/Skip_list

pub mod config;
pub mod encoding;
pub mod errs;
pub mod skiplist;

mod persist;

pub use config::SkipListConfig;
pub use errs::SkipListError;
pub use skiplist::SkipList;
