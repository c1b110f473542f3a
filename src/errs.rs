// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkipListError {
    #[error("os i/o error")]
    Io(#[from] io::Error),
    /// A load stopped early. `inserted` records made it into the list before
    /// the failure.
    #[error("load aborted after {inserted} records")]
    Load {
        inserted: usize,
        #[source]
        source: io::Error,
    },
    #[error("probability must be in (0, 1), got {0}")]
    InvalidProbability(f64),
    #[error("max level {0} exceeds the supported cap")]
    InvalidMaxLevel(usize),
}
