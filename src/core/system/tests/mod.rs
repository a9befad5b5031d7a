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

//! System module tests
//!
//! - `basic`: construction, reset, program loading
//! - `execution`: cycling, unimplemented-instruction policy, tracing
//! - `run_control`: run loop, stop/debug states, published snapshots
//! - `state`: snapshots and save states

mod state;

use super::*;
use crate::core::cpu::Instruction;

/// Physical address test programs are loaded at
pub(super) const LOAD_ADDRESS: u64 = 0x1000;

/// System with a small RDRAM, booted at `LOAD_ADDRESS`
pub(super) fn booted_system(config: EmulatorConfig, program: &[Instruction]) -> System {
    let mut system = System::with_config(EmulatorConfig {
        rdram_size: 256 * 1024,
        ..config
    })
    .unwrap();
    let bytes: Vec<u8> = program.iter().flat_map(|i| i.raw().to_be_bytes()).collect();
    system.load_program(LOAD_ADDRESS, &bytes).unwrap();
    system.boot(System::kseg0(LOAD_ADDRESS));
    system
}
