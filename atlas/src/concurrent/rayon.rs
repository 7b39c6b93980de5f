// fontchain/atlas/src/concurrent/rayon.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An implementation of the executor using the Rayon library.

use crate::concurrent::executor::{Executor, Job};

/// Runs jobs on Rayon's global thread pool.
pub struct RayonExecutor;

impl Executor for RayonExecutor {
    #[inline]
    fn spawn(&self, job: Job) {
        ::rayon::spawn(job)
    }
}
