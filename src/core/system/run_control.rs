// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Run status shared between the emulation loop and its observers

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::CpuSnapshot;

/// Execution state of the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunStatus {
    /// The loop returns after the in-flight instruction
    Stopped = 0,
    /// Free running
    Running = 1,
    /// One instruction per call to `run`, with a snapshot after each
    Debugging = 2,
}

impl From<u8> for RunStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => RunStatus::Running,
            2 => RunStatus::Debugging,
            _ => RunStatus::Stopped,
        }
    }
}

#[derive(Debug)]
struct Shared {
    status: AtomicU8,
    snapshot: Mutex<Option<CpuSnapshot>>,
}

/// Cloneable handle used to drive and observe a [`System`](super::System)
///
/// The system itself stays on the thread that created it. Other threads
/// hold a `RunControl` to change the run status and read the most recently
/// published snapshot.
///
/// # Example
///
/// ```
/// use n64rx::core::system::{RunControl, RunStatus};
///
/// let control = RunControl::new();
/// let remote = control.clone();
///
/// std::thread::spawn(move || remote.stop()).join().unwrap();
/// assert_eq!(control.status(), RunStatus::Stopped);
/// ```
#[derive(Debug, Clone)]
pub struct RunControl {
    shared: Arc<Shared>,
}

impl RunControl {
    /// Create a handle in the `Running` state
    pub fn new() -> Self {
        Self::with_status(RunStatus::Running)
    }

    pub fn with_status(status: RunStatus) -> Self {
        Self {
            shared: Arc::new(Shared {
                status: AtomicU8::new(status as u8),
                snapshot: Mutex::new(None),
            }),
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::from(self.shared.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, status: RunStatus) {
        let previous = self.shared.status.swap(status as u8, Ordering::AcqRel);
        if previous != status as u8 {
            log::debug!("Run status: {:?} -> {:?}", RunStatus::from(previous), status);
        }
    }

    /// Ask the loop to stop after the current instruction
    pub fn stop(&self) {
        self.set_status(RunStatus::Stopped);
    }

    pub fn is_stopped(&self) -> bool {
        self.status() == RunStatus::Stopped
    }

    /// Replace the published snapshot
    pub fn publish(&self, snapshot: CpuSnapshot) {
        let mut slot = self
            .shared
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(snapshot);
    }

    /// Most recently published snapshot
    pub fn latest_snapshot(&self) -> Option<CpuSnapshot> {
        self.shared
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}
