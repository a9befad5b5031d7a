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

//! CPU execution tracer for debugging
//!
//! Writes one line per instruction about to execute to a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{Disassembler, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

/// CPU execution tracer
///
/// Each line shows the address of the next instruction (the queued delay
/// slot if one is pending), its raw encoding, a `*` marker for delay-slot
/// instructions and the disassembly.
///
/// # Example
/// ```no_run
/// use n64rx::core::config::EmulatorConfig;
/// use n64rx::core::cpu::{CPU, CpuTracer};
/// use n64rx::core::memory::Bus;
///
/// let mut cpu = CPU::new();
/// let mut bus = Bus::new(&EmulatorConfig::default()).unwrap();
/// let mut tracer = CpuTracer::new("trace.log", 0).unwrap();
///
/// tracer.trace(&cpu, &bus).unwrap();
/// cpu.step(&mut bus).unwrap();
/// ```
pub struct CpuTracer {
    enabled: bool,
    output: BufWriter<File>,
    /// Maximum number of lines to write (0 = unlimited)
    limit: u64,
    written: u64,
}

impl CpuTracer {
    /// Create a new tracer writing to `path`
    ///
    /// An existing file is truncated. After `limit` lines the tracer
    /// disables itself; 0 means no limit.
    pub fn new(path: impl AsRef<Path>, limit: u64) -> Result<Self> {
        let output = BufWriter::new(File::create(path)?);
        Ok(Self {
            enabled: true,
            output,
            limit,
            written: 0,
        })
    }

    /// Enable or disable tracing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of lines written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Trace the instruction the CPU will execute next
    ///
    /// # Arguments
    ///
    /// * `cpu` - CPU instance to trace
    /// * `bus` - Memory bus used to fetch the instruction word
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the line was written or tracing is off
    /// - `Err(EmulatorError)` if the fetch address cannot be translated or
    ///   the write fails
    pub fn trace(&mut self, cpu: &CPU, bus: &Bus) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let (pc, marker) = match cpu.delay_slot() {
            Some(address) => (address, '*'),
            None => (cpu.pc(), ' '),
        };
        let paddr = cpu.cop0().translate(pc)?;
        let word = bus.read_word(paddr)?;

        writeln!(
            self.output,
            "{:016X}  {:08X} {} {}",
            pc,
            word,
            marker,
            Disassembler::disassemble(word, pc)
        )?;

        self.written += 1;
        if self.limit != 0 && self.written >= self.limit {
            log::info!("Trace limit of {} instructions reached", self.limit);
            self.enabled = false;
            self.output.flush()?;
        }
        Ok(())
    }

    /// Flush buffered lines to disk
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

impl Drop for CpuTracer {
    fn drop(&mut self) {
        if let Err(e) = self.output.flush() {
            log::warn!("Failed to flush trace file: {}", e);
        }
    }
}
