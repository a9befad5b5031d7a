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

//! Typed bit-field views over CP0 registers
//!
//! A view wraps a reference to one word of the CP0 register file and never
//! stores bits of its own. `Status<&u64>` is read-only, `Status<&mut u64>`
//! adds the setters. Two views over the same register always observe the
//! same underlying word.
//!
//! ```text
//! Status (12)
//!  31..28 27 26 25 24  22 21 20   15..8  7  6  5  4..3  2   1   0
//! | CU   |RP|FR|RE|ITS|BEV|TS|SR| IM   |KX|SX|UX| KSU |ERL|EXL|IE|
//!
//! Cause (13)
//!  31  29..28    15..8    6..2
//! | BD | CE  |    IP    | ExcCode |
//!
//! Config (16)
//!  30..28 27..24   15   3   2..0
//! |  EC  |  EP  | BE | CU |  K0  |
//! ```

use std::ops::{Deref, DerefMut};

use super::super::exception::ExceptionCode;

#[inline(always)]
fn field(word: u64, shift: u32, width: u32) -> u64 {
    (word >> shift) & ((1u64 << width) - 1)
}

#[inline(always)]
fn set_field(word: &mut u64, shift: u32, width: u32, value: u64) {
    let mask = ((1u64 << width) - 1) << shift;
    *word = (*word & !mask) | ((value << shift) & mask);
}

#[inline(always)]
fn flag(word: u64, bit: u32) -> bool {
    word & (1u64 << bit) != 0
}

#[inline(always)]
fn set_flag(word: &mut u64, bit: u32, value: bool) {
    set_field(word, bit, 1, value as u64);
}

/// Processor operating mode (Status.KSU)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatingMode {
    Kernel = 0,
    Supervisor = 1,
    User = 2,
}

/// Status register view
pub struct Status<R>(pub(super) R);

impl<R: Deref<Target = u64>> Status<R> {
    /// Global interrupt enable
    pub fn ie(&self) -> bool {
        flag(*self.0, 0)
    }

    /// Exception level
    pub fn exl(&self) -> bool {
        flag(*self.0, 1)
    }

    /// Error level
    pub fn erl(&self) -> bool {
        flag(*self.0, 2)
    }

    /// Effective operating mode
    ///
    /// The processor runs in kernel mode whenever EXL or ERL is set,
    /// regardless of the KSU field.
    pub fn mode(&self) -> OperatingMode {
        if self.exl() || self.erl() {
            return OperatingMode::Kernel;
        }
        match field(*self.0, 3, 2) {
            0 => OperatingMode::Kernel,
            1 => OperatingMode::Supervisor,
            // 3 is undefined on the VR4300; treat it as user mode
            _ => OperatingMode::User,
        }
    }

    /// 64-bit addressing in user mode
    pub fn ux(&self) -> bool {
        flag(*self.0, 5)
    }

    /// 64-bit addressing in supervisor mode
    pub fn sx(&self) -> bool {
        flag(*self.0, 6)
    }

    /// 64-bit addressing in kernel mode
    pub fn kx(&self) -> bool {
        flag(*self.0, 7)
    }

    /// Interrupt mask
    pub fn im(&self) -> u8 {
        field(*self.0, 8, 8) as u8
    }

    /// Diagnostic status sub-fields
    pub fn ds(&self) -> DiagnosticStatus<&u64> {
        DiagnosticStatus(&*self.0)
    }

    /// Reverse endianness in user mode
    pub fn re(&self) -> bool {
        flag(*self.0, 25)
    }

    /// Additional floating-point registers
    pub fn fr(&self) -> bool {
        flag(*self.0, 26)
    }

    /// Low-power mode
    pub fn rp(&self) -> bool {
        flag(*self.0, 27)
    }

    /// Coprocessor usability mask (CU3..CU0)
    pub fn cu(&self) -> u8 {
        field(*self.0, 28, 4) as u8
    }
}

impl<R: DerefMut<Target = u64>> Status<R> {
    pub fn set_ie(&mut self, value: bool) {
        set_flag(&mut *self.0, 0, value);
    }

    pub fn set_exl(&mut self, value: bool) {
        set_flag(&mut *self.0, 1, value);
    }

    pub fn set_erl(&mut self, value: bool) {
        set_flag(&mut *self.0, 2, value);
    }

    pub fn set_mode(&mut self, mode: OperatingMode) {
        set_field(&mut *self.0, 3, 2, mode as u64);
    }

    pub fn set_ux(&mut self, value: bool) {
        set_flag(&mut *self.0, 5, value);
    }

    pub fn set_sx(&mut self, value: bool) {
        set_flag(&mut *self.0, 6, value);
    }

    pub fn set_kx(&mut self, value: bool) {
        set_flag(&mut *self.0, 7, value);
    }

    pub fn set_im(&mut self, value: u8) {
        set_field(&mut *self.0, 8, 8, value as u64);
    }

    pub fn ds_mut(&mut self) -> DiagnosticStatus<&mut u64> {
        DiagnosticStatus(&mut *self.0)
    }

    pub fn set_re(&mut self, value: bool) {
        set_flag(&mut *self.0, 25, value);
    }

    pub fn set_fr(&mut self, value: bool) {
        set_flag(&mut *self.0, 26, value);
    }

    pub fn set_rp(&mut self, value: bool) {
        set_flag(&mut *self.0, 27, value);
    }

    pub fn set_cu(&mut self, value: u8) {
        set_field(&mut *self.0, 28, 4, value as u64);
    }
}

/// Diagnostic status (Status bits [24:16])
pub struct DiagnosticStatus<R>(R);

impl<R: Deref<Target = u64>> DiagnosticStatus<R> {
    /// Soft reset or NMI has occurred
    pub fn sr(&self) -> bool {
        flag(*self.0, 20)
    }

    /// TLB shutdown
    pub fn ts(&self) -> bool {
        flag(*self.0, 21)
    }

    /// Bootstrap exception vectors
    pub fn bev(&self) -> bool {
        flag(*self.0, 22)
    }

    /// Instruction trace support
    pub fn its(&self) -> bool {
        flag(*self.0, 24)
    }

    /// The whole 9-bit field
    pub fn raw(&self) -> u16 {
        field(*self.0, 16, 9) as u16
    }
}

impl<R: DerefMut<Target = u64>> DiagnosticStatus<R> {
    pub fn set_sr(&mut self, value: bool) {
        set_flag(&mut *self.0, 20, value);
    }

    pub fn set_ts(&mut self, value: bool) {
        set_flag(&mut *self.0, 21, value);
    }

    pub fn set_bev(&mut self, value: bool) {
        set_flag(&mut *self.0, 22, value);
    }

    pub fn set_its(&mut self, value: bool) {
        set_flag(&mut *self.0, 24, value);
    }
}

/// Cause register view
pub struct Cause<R>(pub(super) R);

impl<R: Deref<Target = u64>> Cause<R> {
    /// Raw 5-bit exception code
    pub fn exc_code_raw(&self) -> u8 {
        field(*self.0, 2, 5) as u8
    }

    /// Decoded exception code, `None` for reserved encodings
    pub fn exc_code(&self) -> Option<ExceptionCode> {
        ExceptionCode::try_from(self.exc_code_raw()).ok()
    }

    /// Interrupt pending field
    pub fn ip(&self) -> InterruptPending<&u64> {
        InterruptPending(&*self.0)
    }

    /// Coprocessor unit of the last Coprocessor Unusable exception
    pub fn ce(&self) -> u8 {
        field(*self.0, 28, 2) as u8
    }

    /// Last exception was taken in a branch delay slot
    pub fn bd(&self) -> bool {
        flag(*self.0, 31)
    }
}

impl<R: DerefMut<Target = u64>> Cause<R> {
    pub fn set_exc_code(&mut self, code: ExceptionCode) {
        set_field(&mut *self.0, 2, 5, code as u64);
    }

    pub fn ip_mut(&mut self) -> InterruptPending<&mut u64> {
        InterruptPending(&mut *self.0)
    }

    pub fn set_ce(&mut self, unit: u8) {
        set_field(&mut *self.0, 28, 2, unit as u64);
    }

    pub fn set_bd(&mut self, value: bool) {
        set_flag(&mut *self.0, 31, value);
    }
}

/// Interrupt pending field (Cause bits [15:8])
///
/// IP0-IP1 are software interrupts, IP2-IP6 external lines, IP7 the
/// Count/Compare timer.
pub struct InterruptPending<R>(R);

impl<R: Deref<Target = u64>> InterruptPending<R> {
    /// All eight pending bits
    pub fn raw(&self) -> u8 {
        field(*self.0, 8, 8) as u8
    }

    pub fn software(&self) -> u8 {
        field(*self.0, 8, 2) as u8
    }

    pub fn external(&self) -> u8 {
        field(*self.0, 10, 5) as u8
    }

    pub fn timer(&self) -> bool {
        flag(*self.0, 15)
    }
}

impl<R: DerefMut<Target = u64>> InterruptPending<R> {
    pub fn set_software(&mut self, value: u8) {
        set_field(&mut *self.0, 8, 2, value as u64);
    }

    pub fn set_external(&mut self, value: u8) {
        set_field(&mut *self.0, 10, 5, value as u64);
    }

    /// Raise or lower a single external line (0-4, mapped to IP2-IP6)
    pub fn set_external_line(&mut self, line: u8, value: bool) {
        if line < 5 {
            set_flag(&mut *self.0, 10 + line as u32, value);
        }
    }

    pub fn set_timer(&mut self, value: bool) {
        set_flag(&mut *self.0, 15, value);
    }
}

/// Config register view
pub struct Config<R>(pub(super) R);

impl<R: Deref<Target = u64>> Config<R> {
    /// kseg0 cache coherency algorithm
    pub fn k0(&self) -> u8 {
        field(*self.0, 0, 3) as u8
    }

    /// Reserved CU bit
    pub fn cu(&self) -> bool {
        flag(*self.0, 3)
    }

    /// Big-endian memory accesses
    pub fn be(&self) -> bool {
        flag(*self.0, 15)
    }

    /// Writeback data transfer pattern
    pub fn ep(&self) -> u8 {
        field(*self.0, 24, 4) as u8
    }

    /// System clock ratio
    pub fn ec(&self) -> u8 {
        field(*self.0, 28, 3) as u8
    }
}

impl<R: DerefMut<Target = u64>> Config<R> {
    pub fn set_k0(&mut self, value: u8) {
        set_field(&mut *self.0, 0, 3, value as u64);
    }

    pub fn set_cu(&mut self, value: bool) {
        set_flag(&mut *self.0, 3, value);
    }

    pub fn set_be(&mut self, value: bool) {
        set_flag(&mut *self.0, 15, value);
    }

    pub fn set_ep(&mut self, value: u8) {
        set_field(&mut *self.0, 24, 4, value as u64);
    }

    pub fn set_ec(&mut self, value: u8) {
        set_field(&mut *self.0, 28, 3, value as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_share_storage() {
        let mut word = 0u64;
        Status(&mut word).set_im(0xA5);
        Status(&mut word).ds_mut().set_bev(true);

        let a = Status(&word);
        let b = Status(&word);
        assert_eq!(a.im(), 0xA5);
        assert_eq!(b.im(), 0xA5);
        assert!(a.ds().bev());
        assert_eq!(word, (0xA5 << 8) | (1 << 22));
    }

    #[test]
    fn test_mode_forced_to_kernel() {
        let mut word = 0u64;
        let mut status = Status(&mut word);
        status.set_mode(OperatingMode::User);
        assert_eq!(status.mode(), OperatingMode::User);

        status.set_exl(true);
        assert_eq!(status.mode(), OperatingMode::Kernel);

        status.set_exl(false);
        status.set_erl(true);
        assert_eq!(status.mode(), OperatingMode::Kernel);
    }

    #[test]
    fn test_cause_fields() {
        let mut word = 0u64;
        let mut cause = Cause(&mut word);
        cause.set_exc_code(ExceptionCode::CoprocessorUnusable);
        cause.set_ce(1);
        cause.set_bd(true);
        cause.ip_mut().set_timer(true);
        cause.ip_mut().set_external_line(0, true);

        assert_eq!(cause.exc_code(), Some(ExceptionCode::CoprocessorUnusable));
        assert_eq!(cause.ce(), 1);
        assert!(cause.bd());
        assert_eq!(cause.ip().raw(), 0x84);
        assert_eq!(cause.ip().external(), 0x01);
        assert_eq!(cause.ip().software(), 0);
    }

    #[test]
    fn test_config_fields() {
        let mut word = 0u64;
        let mut config = Config(&mut word);
        config.set_be(true);
        config.set_ec(7);
        config.set_k0(3);
        assert!(config.be());
        assert_eq!(config.ec(), 7);
        assert_eq!(config.k0(), 3);
        assert_eq!(word, 0x7000_8003);
    }

    #[test]
    fn test_setters_mask_width() {
        let mut word = 0u64;
        Cause(&mut word).set_ce(0xFF);
        assert_eq!(word, 0x3 << 28);
    }
}
