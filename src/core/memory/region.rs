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

//! Physical memory region identification

use super::Bus;

/// Memory region identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Main RDRAM
    Rdram,
    /// RDRAM configuration registers
    RdramRegisters,
    /// Signal processor DMEM/IMEM
    SpMemory,
    /// Signal processor registers
    SpRegisters,
    /// Display processor command registers
    DpCommand,
    /// MIPS/video/audio/peripheral/RDRAM/serial interfaces
    RcpInterface,
    /// Cartridge domains
    Cartridge,
    /// PIF boot ROM
    PifRom,
    /// PIF RAM
    PifRam,
    /// Nothing mapped
    Unmapped,
}

impl Bus {
    /// Identify the memory region for a physical address
    ///
    /// # Arguments
    ///
    /// * `paddr` - Physical address (already translated by CP0)
    ///
    /// # Example
    ///
    /// ```
    /// use n64rx::core::config::EmulatorConfig;
    /// use n64rx::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new(&EmulatorConfig::default()).unwrap();
    ///
    /// assert_eq!(bus.identify_region(0x0000_0000), MemoryRegion::Rdram);
    /// assert_eq!(bus.identify_region(0x0440_0000), MemoryRegion::RcpInterface);
    /// assert_eq!(bus.identify_region(0x1FC0_0000), MemoryRegion::PifRom);
    /// assert_eq!(bus.identify_region(0x1FC0_07C0), MemoryRegion::PifRam);
    /// ```
    pub fn identify_region(&self, paddr: u64) -> MemoryRegion {
        if paddr < self.rdram_size() as u64 {
            MemoryRegion::Rdram
        } else if (Self::RDRAM_REGS_START..=Self::RDRAM_REGS_END).contains(&paddr) {
            MemoryRegion::RdramRegisters
        } else if (Self::SP_MEM_START..=Self::SP_MEM_END).contains(&paddr) {
            MemoryRegion::SpMemory
        } else if (Self::SP_REGS_START..=Self::SP_REGS_END).contains(&paddr) {
            MemoryRegion::SpRegisters
        } else if (Self::DP_CMD_START..=Self::DP_CMD_END).contains(&paddr) {
            MemoryRegion::DpCommand
        } else if (Self::RCP_START..=Self::RCP_END).contains(&paddr) {
            MemoryRegion::RcpInterface
        } else if (Self::CART_START..=Self::CART_END).contains(&paddr) {
            MemoryRegion::Cartridge
        } else if (Self::PIF_ROM_START..=Self::PIF_ROM_END).contains(&paddr) {
            MemoryRegion::PifRom
        } else if (Self::PIF_RAM_START..=Self::PIF_RAM_END).contains(&paddr) {
            MemoryRegion::PifRam
        } else {
            MemoryRegion::Unmapped
        }
    }
}
