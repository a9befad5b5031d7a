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

//! Core emulation components
//!
//! - CPU (NEC VR4300, MIPS III) with CP0 and a minimal CP1
//! - Memory bus over the N64 physical address map
//! - System integration: run loop, snapshots, save states

pub mod config;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod save_state;
pub mod system;

// Re-export commonly used types
pub use config::EmulatorConfig;
pub use cpu::CPU;
pub use error::{EmulatorError, Result};
pub use memory::Bus;
pub use system::System;
