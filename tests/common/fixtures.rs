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

//! Test fixtures for common test scenarios

use n64rx::core::config::EmulatorConfig;
use n64rx::core::cpu::Instruction;
use n64rx::core::system::System;

/// Physical address test programs are loaded at
#[allow(dead_code)]
pub const LOAD_ADDRESS: u64 = 0x1000;

/// Physical address of the general exception handler (BEV clear)
#[allow(dead_code)]
pub const HANDLER_ADDRESS: u64 = 0x180;

/// Big-endian image of a sequence of instructions
#[allow(dead_code)]
pub fn assemble(program: &[Instruction]) -> Vec<u8> {
    program
        .iter()
        .flat_map(|instruction| instruction.raw().to_be_bytes())
        .collect()
}

/// System with a 1 MiB RDRAM
#[allow(dead_code)]
pub fn create_test_system() -> System {
    let config = EmulatorConfig {
        rdram_size: 1024 * 1024,
        ..Default::default()
    };
    System::with_config(config).expect("Failed to build system")
}

/// Load `program` at `LOAD_ADDRESS` and boot into it
#[allow(dead_code)]
pub fn boot_program(program: &[Instruction]) -> System {
    let mut system = create_test_system();
    system
        .load_program(LOAD_ADDRESS, &assemble(program))
        .expect("Failed to load program");
    system.boot(System::kseg0(LOAD_ADDRESS));
    system
}

/// Install an exception handler at the general vector
#[allow(dead_code)]
pub fn install_handler(system: &mut System, handler: &[Instruction]) {
    system
        .load_program(HANDLER_ADDRESS, &assemble(handler))
        .expect("Failed to load handler");
}
