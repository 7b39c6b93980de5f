// fontchain/atlas/src/concurrent/executor.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An abstraction over threading and parallelism systems such as Rayon.

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An abstraction over threading and parallelism systems such as Rayon.
///
/// The atlas never holds its lock while a job runs, so an executor may run the job before
/// `spawn` returns.
pub trait Executor: Send + Sync {
    fn spawn(&self, job: Job);
}

/// Runs every job on the calling thread.
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    #[inline]
    fn spawn(&self, job: Job) {
        job()
    }
}
