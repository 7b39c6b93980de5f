// fontchain/atlas/src/task.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pending font loads and the handles they resolve to.
//!
//! A cache entry owns one `TaskSlot`. Every `FontTask` and `FontHandle` obtained from the entry
//! holds a lease on the entry's user count, so the atlas can tell which entries nobody uses.

use crate::error::{AtlasError, AtlasResult};
use crate::font::PhysicalFont;
use parking_lot::{Condvar, Mutex};
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The work that constructs a font.
pub(crate) type FontJob = Box<dyn FnOnce() -> AtlasResult<Arc<dyn PhysicalFont>> + Send>;

enum TaskState {
    Queued(Option<FontJob>),
    Running,
    Ready(Arc<dyn PhysicalFont>),
    Failed(AtlasError),
}

pub(crate) struct TaskSlot {
    state: Mutex<TaskState>,
    finished: Condvar,
}

impl TaskSlot {
    pub(crate) fn queued(job: FontJob) -> Arc<TaskSlot> {
        Arc::new(TaskSlot {
            state: Mutex::new(TaskState::Queued(Some(job))),
            finished: Condvar::new(),
        })
    }

    /// Runs the job if nobody has started it yet.
    pub(crate) fn run(&self) {
        let job = {
            let mut state = self.state.lock();
            match *state {
                TaskState::Queued(ref mut job) => {
                    let job = job.take();
                    *state = TaskState::Running;
                    job
                }
                _ => None,
            }
        };
        let job = match job {
            Some(job) => job,
            None => return,
        };

        let result = job();
        let mut state = self.state.lock();
        *state = match result {
            Ok(font) => TaskState::Ready(font),
            Err(error) => TaskState::Failed(error),
        };
        self.finished.notify_all();
    }

    /// Blocks until the font is constructed. A job no executor has picked up yet runs on the
    /// calling thread.
    pub(crate) fn wait(&self) -> AtlasResult<Arc<dyn PhysicalFont>> {
        self.run();
        let mut state = self.state.lock();
        loop {
            let result = match *state {
                TaskState::Ready(ref font) => Some(Ok(font.clone())),
                TaskState::Failed(ref error) => Some(Err(error.clone())),
                TaskState::Queued(_) | TaskState::Running => None,
            };
            match result {
                Some(result) => return result,
                None => self.finished.wait(&mut state),
            }
        }
    }

    pub(crate) fn try_get(&self) -> Option<AtlasResult<Arc<dyn PhysicalFont>>> {
        match *self.state.lock() {
            TaskState::Ready(ref font) => Some(Ok(font.clone())),
            TaskState::Failed(ref error) => Some(Err(error.clone())),
            TaskState::Queued(_) | TaskState::Running => None,
        }
    }

    pub(crate) fn error(&self) -> Option<AtlasError> {
        match *self.state.lock() {
            TaskState::Failed(ref error) => Some(error.clone()),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn is_failed(&self) -> bool {
        self.error().is_some()
    }
}

/// One use of a cache entry. Dropping it gives the use back immediately.
pub(crate) struct Lease {
    users: Arc<AtomicUsize>,
}

impl Lease {
    pub(crate) fn new(users: &Arc<AtomicUsize>) -> Lease {
        users.fetch_add(1, Ordering::AcqRel);
        Lease { users: users.clone() }
    }

    /// A lease on a count nothing else shares.
    pub(crate) fn detached() -> Lease {
        Lease::new(&Arc::new(AtomicUsize::new(0)))
    }
}

impl Clone for Lease {
    #[inline]
    fn clone(&self) -> Lease {
        Lease::new(&self.users)
    }
}

impl Drop for Lease {
    #[inline]
    fn drop(&mut self) {
        self.users.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A font load that may still be in progress.
#[derive(Clone)]
pub struct FontTask {
    slot: Arc<TaskSlot>,
    lease: Lease,
    size_px: f32,
}

impl FontTask {
    pub(crate) fn new(slot: Arc<TaskSlot>, lease: Lease, size_px: f32) -> FontTask {
        FontTask { slot, lease, size_px }
    }

    /// The pixel size the font was requested at.
    #[inline]
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.slot.try_get().is_some()
    }

    /// The result, if the load has finished.
    pub fn try_get(&self) -> Option<AtlasResult<FontHandle>> {
        self.slot.try_get().map(|result| {
            result.map(|font| FontHandle::new(font, self.lease.clone()))
        })
    }

    pub fn wait(&self) -> AtlasResult<FontHandle> {
        let font = self.slot.wait()?;
        Ok(FontHandle::new(font, self.lease.clone()))
    }
}

impl Debug for FontTask {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("FontTask")
                 .field("size_px", &self.size_px)
                 .field("completed", &self.is_completed())
                 .finish()
    }
}

/// A constructed font. The atlas keeps the font's cache entry while any handle to it exists.
#[derive(Clone)]
pub struct FontHandle {
    font: Arc<dyn PhysicalFont>,
    _lease: Lease,
}

impl FontHandle {
    pub(crate) fn new(font: Arc<dyn PhysicalFont>, lease: Lease) -> FontHandle {
        FontHandle { font, _lease: lease }
    }

    /// A handle to a font that lives outside any cache.
    pub(crate) fn detached(font: Arc<dyn PhysicalFont>) -> FontHandle {
        FontHandle::new(font, Lease::detached())
    }

    #[inline]
    pub fn font(&self) -> &Arc<dyn PhysicalFont> {
        &self.font
    }

    /// True if both handles refer to the same font object.
    #[inline]
    pub fn same_font(&self, other: &FontHandle) -> bool {
        self.font.handle() == other.font.handle()
    }
}

impl Deref for FontHandle {
    type Target = dyn PhysicalFont;

    #[inline]
    fn deref(&self) -> &(dyn PhysicalFont + 'static) {
        &*self.font
    }
}

impl Debug for FontHandle {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("FontHandle")
                 .field("handle", &self.font.handle())
                 .field("metrics", &self.font.metrics())
                 .finish()
    }
}
