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

//! Nintendo 64 CPU emulator core library
//!
//! This library provides a VR4300 (MIPS III) interpreter with its system
//! control coprocessor, exception processing and a memory-mapped bus laid
//! out like the N64 physical address space.
//!
//! # Example
//!
//! ```
//! use n64rx::core::config::EmulatorConfig;
//! use n64rx::core::cpu::CPU;
//! use n64rx::core::memory::Bus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = Bus::new(&EmulatorConfig::default()).unwrap();
//!
//! // NOP in RDRAM, fetched through kseg0
//! cpu.set_pc(0xFFFF_FFFF_8000_0000);
//! cpu.step(&mut bus).unwrap();
//! ```

pub mod core;
