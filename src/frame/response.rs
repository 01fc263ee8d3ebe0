// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded response data, one type per response layout.

use super::*;
use crate::error::Error;
use alloc::{vec, vec::Vec};

/// Response to [`Request::ReadCoils`] and [`Request::ReadDiscreteInputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBits {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub byte_count: u8,
    /// Status octets as received, the first bit in the LSB of the first byte.
    pub bits: Vec<u8>,
}

impl ReadBits {
    /// Unpack the first `quantity` bits into booleans.
    pub fn coils(&self, quantity: Quantity) -> Result<Vec<Coil>, Error> {
        let mut coils = vec![false; usize::from(quantity)];
        unpack_coils(&self.bits, quantity, &mut coils)?;
        Ok(coils)
    }
}

/// Response to [`Request::ReadHoldingRegisters`] and [`Request::ReadInputRegisters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRegisters {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub byte_count: u8,
    pub registers: Vec<Word>,
}

/// Echo of [`Request::WriteSingleCoil`] or [`Request::WriteSingleRegister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSingle {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub address: Address,
    pub value: Word,
}

impl WriteSingle {
    /// Interpret the echoed value as a coil state.
    pub const fn coil(&self) -> Result<Coil, Error> {
        u16_coil_to_bool(self.value)
    }
}

/// Response to [`Request::ReadExceptionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionStatus {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub data: u8,
}

/// Response to [`Request::Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub subfunction: SubFunctionCode,
    pub data: Vec<Word>,
}

/// Response to [`Request::GetCommEventCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommEventCounter {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub status: u16,
    pub event_count: u16,
}

/// Response to [`Request::GetCommEventLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommEventLog {
    pub station: SlaveId,
    pub function: FunctionCode,
    pub byte_count: u8,
    pub status: u16,
    pub event_count: u16,
    pub message_count: u16,
    /// Event bytes, most recent first.
    pub events: Vec<u8>,
}
