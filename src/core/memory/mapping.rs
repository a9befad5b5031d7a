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

//! Address-range dispatch tables
//!
//! A [`MemoryMap`] is a flat list of [`MappingEntry`] values. Each entry
//! covers an inclusive address range and owns optional word read/write
//! handlers. Tables compose: [`MemoryMap::forward`] turns a whole sub-table
//! into a single entry of its parent, which is how the RCP interface
//! registers hang off the root map.
//!
//! ```text
//! root ─┬─ RDRAM          0x0000_0000
//!       ├─ RCP (forward) ─┬─ MI 0x0430_0000
//!       │                 ├─ VI 0x0440_0000
//!       │                 └─ ...
//!       └─ PIF ROM        0x1FC0_0000
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::io_device::IODevice;
use crate::core::error::{Access, EmulatorError, Result};

/// Word read handler
pub type ReadWordFn = Box<dyn Fn(u64) -> Result<u32>>;

/// Word write handler
pub type WriteWordFn = Box<dyn Fn(u64, u32) -> Result<()>>;

/// One address range of a dispatch table
pub struct MappingEntry {
    name: String,
    start: u64,
    end: u64,
    /// Pass `address - start` to the handlers instead of the absolute address
    offset: bool,
    read: Option<ReadWordFn>,
    write: Option<WriteWordFn>,
}

impl MappingEntry {
    /// Create an entry without handlers
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in logs
    /// * `start` - First address (inclusive)
    /// * `end` - Last address (inclusive)
    /// * `offset` - Whether handlers receive zero-based offsets
    pub fn new(name: impl Into<String>, start: u64, end: u64, offset: bool) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            offset,
            read: None,
            write: None,
        }
    }

    pub fn with_read(mut self, read: impl Fn(u64) -> Result<u32> + 'static) -> Self {
        self.read = Some(Box::new(read));
        self
    }

    pub fn with_write(mut self, write: impl Fn(u64, u32) -> Result<()> + 'static) -> Self {
        self.write = Some(Box::new(write));
        self
    }

    /// Entry backed by a shared [`IODevice`]
    ///
    /// The range comes from the device and handlers receive offsets.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use n64rx::core::memory::{MappingEntry, RegisterBlock};
    ///
    /// let vi = Rc::new(RefCell::new(RegisterBlock::new("VI", 0x0440_0000, 14)));
    /// let entry = MappingEntry::device(vi.clone());
    ///
    /// entry.write_word(0x0440_0004, 0x1234).unwrap();
    /// assert_eq!(vi.borrow().register(1), 0x1234);
    /// ```
    pub fn device<D: IODevice + 'static>(device: Rc<RefCell<D>>) -> Self {
        let (start, end) = device.borrow().address_range();
        let name = device.borrow().name().to_string();
        let reader = Rc::clone(&device);
        Self::new(name, start, end, true)
            .with_read(move |offset| reader.borrow().read_register(offset as u32))
            .with_write(move |offset, value| {
                device.borrow_mut().write_register(offset as u32, value)
            })
    }

    /// Like [`MappingEntry::device`] but without a write handler
    pub fn read_only_device<D: IODevice + 'static>(device: Rc<RefCell<D>>) -> Self {
        let (start, end) = device.borrow().address_range();
        let name = device.borrow().name().to_string();
        Self::new(name, start, end, true)
            .with_read(move |offset| device.borrow().read_register(offset as u32))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Inclusive range test
    #[inline(always)]
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address <= self.end
    }

    fn overlaps(&self, other: &MappingEntry) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    #[inline(always)]
    fn handler_address(&self, address: u64) -> u64 {
        if self.offset {
            address - self.start
        } else {
            address
        }
    }

    /// Read a word through this entry
    pub fn read_word(&self, address: u64) -> Result<u32> {
        match &self.read {
            Some(read) => read(self.handler_address(address)),
            None => Err(EmulatorError::AccessViolation {
                address,
                access: Access::Read,
            }),
        }
    }

    /// Write a word through this entry
    pub fn write_word(&self, address: u64, value: u32) -> Result<()> {
        match &self.write {
            Some(write) => write(self.handler_address(address), value),
            None => Err(EmulatorError::AccessViolation {
                address,
                access: Access::Write,
            }),
        }
    }
}

impl fmt::Debug for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingEntry")
            .field("name", &self.name)
            .field("start", &format_args!("0x{:08X}", self.start))
            .field("end", &format_args!("0x{:08X}", self.end))
            .field("offset", &self.offset)
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// A dispatch table of non-overlapping entries
#[derive(Debug, Default)]
pub struct MemoryMap {
    entries: Vec<MappingEntry>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry, rejecting overlaps with existing ones
    pub fn push(&mut self, entry: MappingEntry) -> Result<()> {
        if let Some(existing) = self.entries.iter().find(|e| e.overlaps(&entry)) {
            log::warn!(
                "Mapping {} overlaps {} at 0x{:08X}-0x{:08X}",
                entry.name,
                existing.name,
                existing.start,
                existing.end
            );
            return Err(EmulatorError::OverlappingMapping {
                start: entry.start,
                end: entry.end,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Forward `start..=end` of this table to `sub`
    ///
    /// The sub-table sees absolute addresses, so its own entries are laid
    /// out at their real locations.
    pub fn forward(
        &mut self,
        name: impl Into<String>,
        start: u64,
        end: u64,
        sub: MemoryMap,
    ) -> Result<()> {
        let sub = Rc::new(sub);
        let reader = Rc::clone(&sub);
        let entry = MappingEntry::new(name, start, end, false)
            .with_read(move |address| reader.read_word(address))
            .with_write(move |address, value| sub.write_word(address, value));
        self.push(entry)
    }

    /// Find the first entry containing `address`
    pub fn find(&self, address: u64) -> Result<&MappingEntry> {
        self.entries
            .iter()
            .find(|e| e.contains(address))
            .ok_or(EmulatorError::UnmappedAddress { address })
    }

    pub fn read_word(&self, address: u64) -> Result<u32> {
        let entry = self.find(address)?;
        let value = entry.read_word(address)?;
        log::trace!("{} read 0x{:08X} -> 0x{:08X}", entry.name, address, value);
        Ok(value)
    }

    pub fn write_word(&self, address: u64, value: u32) -> Result<()> {
        let entry = self.find(address)?;
        log::trace!("{} write 0x{:08X} <- 0x{:08X}", entry.name, address, value);
        entry.write_word(address, value)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
