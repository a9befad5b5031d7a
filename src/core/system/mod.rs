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

//! System integration module
//!
//! Ties the CPU to the memory bus and provides the emulation loop, run
//! control, snapshots and save states.

mod run_control;
mod snapshot;

pub use run_control::{RunControl, RunStatus};
pub use snapshot::CpuSnapshot;

use std::path::Path;

use super::config::EmulatorConfig;
use super::cpu::{CpuTracer, CPU, KSEG0_START};
use super::error::Result;
use super::memory::Bus;
use super::save_state::SaveState;

/// Nintendo 64 CPU system
///
/// Owns the VR4300 core and the physical memory bus.
///
/// # Example
/// ```
/// use n64rx::core::system::System;
///
/// let mut system = System::new().unwrap();
///
/// // addiu t0, zero, 5
/// system.load_program(0x1000, &[0x24, 0x08, 0x00, 0x05]).unwrap();
/// system.boot(0xFFFF_FFFF_8000_1000);
/// system.step_n(1).unwrap();
///
/// assert_eq!(system.cpu().reg(8), 5);
/// assert_eq!(system.cycles(), 1);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,
    /// Memory bus
    bus: Bus,
    config: EmulatorConfig,
    /// Total cycles executed
    cycles: u64,
    /// CPU tracer for debugging (optional)
    tracer: Option<CpuTracer>,
}

impl System {
    /// Create a system with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(EmulatorConfig::default())
    }

    /// Create a system from a configuration
    ///
    /// # Returns
    ///
    /// The system, or the bus construction error if the configured memory
    /// map is invalid
    pub fn with_config(config: EmulatorConfig) -> Result<Self> {
        let bus = Bus::new(&config)?;
        let cpu = CPU::with_config(&config);

        log::info!(
            "System initialized: {} KiB RDRAM, {}-endian",
            config.rdram_size / 1024,
            if config.big_endian { "big" } else { "little" }
        );

        Ok(Self {
            cpu,
            bus,
            config,
            cycles: 0,
            tracer: None,
        })
    }

    /// Reset the system
    ///
    /// Clears RDRAM and cold-resets the CPU. The cycle count restarts at 0.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset();
        self.cycles = 0;
        log::info!("System reset");
    }

    /// Copy a big-endian program image into RDRAM
    ///
    /// # Arguments
    ///
    /// * `paddr` - Word-aligned physical load address
    /// * `data` - Raw image bytes
    pub fn load_program(&mut self, paddr: u64, data: &[u8]) -> Result<()> {
        self.bus.load_rdram(paddr, data)?;
        log::info!("Loaded {} byte program at 0x{:08X}", data.len(), paddr);
        Ok(())
    }

    /// Read a program image from disk and load it at `paddr`
    ///
    /// # Returns
    ///
    /// The number of bytes loaded
    pub fn load_program_file<P: AsRef<Path>>(&mut self, path: P, paddr: u64) -> Result<usize> {
        let data = std::fs::read(path.as_ref())?;
        self.load_program(paddr, &data)?;
        Ok(data.len())
    }

    /// Start executing at `entry` the way the PIF hands over to a game
    ///
    /// Leaves the reset state (ERL and BEV cleared) so exceptions use the
    /// normal RAM vectors.
    pub fn boot(&mut self, entry: u64) {
        {
            let mut status = self.cpu.cop0_mut().status_mut();
            status.set_erl(false);
            status.ds_mut().set_bev(false);
        }
        self.cpu.registers_mut().delay_slot = None;
        self.cpu.set_pc(entry);
        log::info!("Booting at 0x{:016X}", entry);
    }

    /// kseg0 address of a physical load address
    pub fn kseg0(paddr: u64) -> u64 {
        KSEG0_START + paddr
    }

    /// Execute one cycle
    ///
    /// Unimplemented instructions are logged and skipped unless the
    /// configuration asks to halt on them.
    pub fn cycle(&mut self) -> Result<()> {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.trace(&self.cpu, &self.bus)?;
        }

        let result = self.cpu.cycle(&mut self.bus);
        self.cycles += 1;

        match result {
            Err(e) if e.is_recoverable() && !self.config.halt_on_unimplemented => {
                log::warn!("{}", e);
                Ok(())
            }
            other => other,
        }
    }

    /// Execute `n` cycles
    pub fn step_n(&mut self, n: u64) -> Result<()> {
        for _ in 0..n {
            self.cycle()?;
        }
        Ok(())
    }

    /// Run until `control` is stopped
    ///
    /// See [`System::run_for`].
    pub fn run(&mut self, control: &RunControl) -> Result<u64> {
        self.run_for(control, u64::MAX)
    }

    /// Run until `control` is stopped or `max_cycles` have executed
    ///
    /// In the `Debugging` state a single instruction executes and the call
    /// returns. A snapshot is published every `snapshot_interval` cycles and
    /// whenever the loop returns. On error the status is set to `Stopped`.
    ///
    /// # Returns
    ///
    /// The number of cycles executed by this call
    pub fn run_for(&mut self, control: &RunControl, max_cycles: u64) -> Result<u64> {
        let start = self.cycles;
        let interval = self.config.snapshot_interval.max(1);

        while self.cycles - start < max_cycles {
            let status = control.status();
            if status == RunStatus::Stopped {
                break;
            }

            if let Err(e) = self.cycle() {
                log::error!("Emulation stopped: {}", e);
                control.stop();
                control.publish(self.snapshot());
                return Err(e);
            }

            if status == RunStatus::Debugging {
                break;
            }
            if self.cycles % interval == 0 {
                control.publish(self.snapshot());
            }
        }

        control.publish(self.snapshot());
        Ok(self.cycles - start)
    }

    /// Capture the current CPU state
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot::capture(&self.cpu, self.cycles)
    }

    /// Write a save state to `path`
    pub fn save_state<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        SaveState::from_system(self).save_to_file(path)
    }

    /// Restore a save state written by [`System::save_state`]
    pub fn load_state<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        SaveState::load_from_file(path)?.apply(self)
    }

    /// Restore the CPU, memory and cycle count from a decoded state
    pub(crate) fn restore(&mut self, snapshot: &CpuSnapshot, rdram: &[u32]) -> Result<()> {
        self.bus.rdram().borrow_mut().restore(rdram)?;
        snapshot.restore(&mut self.cpu);
        self.cycles = snapshot.cycles;
        Ok(())
    }

    pub fn pc(&self) -> u64 {
        self.cpu.pc()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Enable CPU execution tracing
    ///
    /// Every executed instruction is written to `path`, up to `limit`
    /// lines (0 = unlimited).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use n64rx::core::system::System;
    ///
    /// let mut system = System::new().unwrap();
    /// system.enable_tracing("trace.log", 5000).unwrap();
    /// ```
    pub fn enable_tracing<P: AsRef<Path>>(&mut self, path: P, limit: u64) -> Result<()> {
        let path = path.as_ref();
        self.tracer = Some(CpuTracer::new(path, limit)?);
        log::info!(
            "CPU tracing enabled: {} (limit: {})",
            path.display(),
            if limit == 0 {
                "unlimited".to_string()
            } else {
                limit.to_string()
            }
        );
        Ok(())
    }

    /// Close the trace file
    pub fn disable_tracing(&mut self) {
        if let Some(tracer) = self.tracer.take() {
            log::info!(
                "CPU tracing disabled (traced {} instructions)",
                tracer.written()
            );
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.as_ref().is_some_and(|t| t.is_enabled())
    }

    /// Number of instructions traced so far
    pub fn trace_count(&self) -> u64 {
        self.tracer.as_ref().map_or(0, |t| t.written())
    }
}

#[cfg(test)]
mod tests;
