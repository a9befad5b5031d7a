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

//! Memory bus for the Nintendo 64 physical address space
//!
//! The Bus routes 32-bit word reads and writes by physical address. Address
//! translation happens in CP0 before an access reaches this layer, and
//! byte/halfword/doubleword accesses are synthesised by the CPU on top of
//! word accesses.
//!
//! # Memory Map
//!
//! | Physical Address Range  | Region          | Access |
//! |-------------------------|-----------------|--------|
//! | 0x00000000-(size - 1)   | RDRAM           | R/W    |
//! | 0x03F00000-0x03F00027   | RDRAM registers | R/W    |
//! | 0x04000000-0x04001FFF   | SP DMEM/IMEM    | R/W    |
//! | 0x04040000-0x0404001F   | SP registers    | R/W    |
//! | 0x04100000-0x0410001F   | DP command      | R/W    |
//! | 0x04300000-0x048FFFFF   | MI/VI/AI/PI/RI/SI (forwarded) | R/W |
//! | 0x1FC00000-0x1FC007BF   | PIF ROM         | R only |
//! | 0x1FC007C0-0x1FC007FF   | PIF RAM         | R/W    |
//!
//! # Example
//!
//! ```
//! use n64rx::core::config::EmulatorConfig;
//! use n64rx::core::memory::Bus;
//!
//! let bus = Bus::new(&EmulatorConfig::default()).unwrap();
//!
//! bus.write_word(0x0000_1000, 0x1234_5678).unwrap();
//! assert_eq!(bus.read_word(0x0000_1000).unwrap(), 0x1234_5678);
//!
//! // PIF ROM has no write handler
//! assert!(bus.write_word(0x1FC0_0000, 0).is_err());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::EmulatorConfig;
use crate::core::error::Result;

mod io_device;
mod mapping;
mod rdram;
mod region;

pub use io_device::{IODevice, RegisterBlock};
pub use mapping::{MappingEntry, MemoryMap, ReadWordFn, WriteWordFn};
pub use rdram::Rdram;
pub use region::MemoryRegion;

/// Memory bus owning the root dispatch table
pub struct Bus {
    /// Root table
    map: MemoryMap,

    /// Main memory, shared with the RDRAM mapping entry
    rdram: Rc<RefCell<Rdram>>,

    /// PIF boot ROM, shared with its read-only mapping entry
    pif_rom: Rc<RefCell<RegisterBlock>>,
}

impl Bus {
    const RDRAM_REGS_START: u64 = 0x03F0_0000;
    const RDRAM_REGS_END: u64 = 0x03FF_FFFF;

    const SP_MEM_START: u64 = 0x0400_0000;
    const SP_MEM_END: u64 = 0x0403_FFFF;
    const SP_MEM_SIZE: usize = 0x2000;

    const SP_REGS_START: u64 = 0x0404_0000;
    const SP_REGS_END: u64 = 0x040F_FFFF;

    const DP_CMD_START: u64 = 0x0410_0000;
    const DP_CMD_END: u64 = 0x041F_FFFF;

    /// MI through SI, forwarded to the RCP sub-table
    const RCP_START: u64 = 0x0430_0000;
    const RCP_END: u64 = 0x048F_FFFF;

    const CART_START: u64 = 0x0500_0000;
    const CART_END: u64 = 0x1FBF_FFFF;

    const PIF_ROM_START: u64 = 0x1FC0_0000;
    const PIF_ROM_END: u64 = 0x1FC0_07BF;
    const PIF_ROM_SIZE: usize = 0x7C0;

    const PIF_RAM_START: u64 = 0x1FC0_07C0;
    const PIF_RAM_END: u64 = 0x1FC0_07FF;
    const PIF_RAM_SIZE: usize = 0x40;

    /// Build the N64 physical memory map
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the RDRAM size
    ///
    /// # Returns
    ///
    /// The bus, or `OverlappingMapping` if the configured RDRAM size runs
    /// into the register space
    pub fn new(config: &EmulatorConfig) -> Result<Self> {
        config.validate()?;

        let rdram = Rc::new(RefCell::new(Rdram::new(config.rdram_size)));
        let pif_rom = Rc::new(RefCell::new(RegisterBlock::with_bytes(
            "PIF ROM",
            Self::PIF_ROM_START,
            Self::PIF_ROM_SIZE,
        )));

        let mut map = MemoryMap::new();
        map.push(MappingEntry::device(Rc::clone(&rdram)))?;
        map.push(Self::block("RDRAM registers", Self::RDRAM_REGS_START, 10))?;
        map.push(Self::bytes("SP memory", Self::SP_MEM_START, Self::SP_MEM_SIZE))?;
        map.push(Self::block("SP registers", Self::SP_REGS_START, 8))?;
        map.push(Self::block("DP command", Self::DP_CMD_START, 8))?;
        map.forward("RCP", Self::RCP_START, Self::RCP_END, Self::rcp_map()?)?;
        map.push(MappingEntry::read_only_device(Rc::clone(&pif_rom)))?;
        map.push(Self::bytes("PIF RAM", Self::PIF_RAM_START, Self::PIF_RAM_SIZE))?;

        log::debug!("Memory map built with {} root entries", map.len());

        Ok(Self {
            map,
            rdram,
            pif_rom,
        })
    }

    /// RCP interface registers, laid out at their absolute addresses
    fn rcp_map() -> Result<MemoryMap> {
        let mut rcp = MemoryMap::new();
        rcp.push(Self::block("MI", 0x0430_0000, 4))?;
        rcp.push(Self::block("VI", 0x0440_0000, 14))?;
        rcp.push(Self::block("AI", 0x0450_0000, 6))?;
        rcp.push(Self::block("PI", 0x0460_0000, 13))?;
        rcp.push(Self::block("RI", 0x0470_0000, 8))?;
        rcp.push(Self::block("SI", 0x0480_0000, 7))?;
        Ok(rcp)
    }

    fn block(name: &str, base: u64, count: usize) -> MappingEntry {
        MappingEntry::device(Rc::new(RefCell::new(RegisterBlock::new(name, base, count))))
    }

    fn bytes(name: &str, base: u64, size: usize) -> MappingEntry {
        MappingEntry::device(Rc::new(RefCell::new(RegisterBlock::with_bytes(
            name, base, size,
        ))))
    }

    /// Read a word at a physical address
    pub fn read_word(&self, paddr: u64) -> Result<u32> {
        self.map.read_word(paddr)
    }

    /// Write a word at a physical address
    pub fn write_word(&self, paddr: u64, value: u32) -> Result<()> {
        self.map.write_word(paddr, value)
    }

    /// Add a device to the root table
    ///
    /// Fails if its range overlaps an existing entry.
    pub fn register_device<D: IODevice + 'static>(&mut self, device: Rc<RefCell<D>>) -> Result<()> {
        let entry = MappingEntry::device(device);
        log::info!(
            "Registered device {} at 0x{:08X}-0x{:08X}",
            entry.name(),
            entry.start(),
            entry.end()
        );
        self.map.push(entry)
    }

    /// Shared handle to main memory
    pub fn rdram(&self) -> Rc<RefCell<Rdram>> {
        Rc::clone(&self.rdram)
    }

    pub fn rdram_size(&self) -> usize {
        self.rdram.borrow().size()
    }

    /// Copy a big-endian program image into RDRAM
    pub fn load_rdram(&mut self, paddr: u64, data: &[u8]) -> Result<()> {
        self.rdram.borrow_mut().load(paddr as usize, data)
    }

    /// Install a PIF boot ROM image
    pub fn load_pif_rom(&mut self, data: &[u8]) {
        if data.len() > Self::PIF_ROM_SIZE {
            log::warn!(
                "PIF ROM image is {} bytes, truncating to {}",
                data.len(),
                Self::PIF_ROM_SIZE
            );
        }
        self.pif_rom.borrow_mut().load_bytes(data);
    }

    /// Clear volatile memory
    ///
    /// The PIF ROM keeps its contents.
    pub fn reset(&mut self) {
        self.rdram.borrow_mut().clear();
    }

    pub fn map(&self) -> &MemoryMap {
        &self.map
    }
}

#[cfg(test)]
mod tests;
