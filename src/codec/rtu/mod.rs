// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use byteorder::LittleEndian;

pub mod client;
pub use crate::frame::SlaveId;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Slave address, function code and CRC.
pub const MIN_FRAME_LEN: usize = 4;

/// Exception responses carry station, function, exception code and CRC.
pub const EXCEPTION_FRAME_LEN: usize = 5;

/// RTU header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub slave: SlaveId,
}

/// A request addressed to one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAdu<'r> {
    pub hdr: Header,
    pub pdu: RequestPdu<'r>,
}

/// A validated response and the station that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseAdu<'r> {
    pub hdr: Header,
    pub pdu: ResponsePdu<'r>,
}

/// An extracted RTU PDU frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub pdu: &'a [u8],
}

impl DecodedFrame<'_> {
    /// The function code of the PDU.
    #[must_use]
    pub fn function(&self) -> FunctionCode {
        self.pdu.first().copied().unwrap_or_default().into()
    }
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The sum is transmitted low byte first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC of `buf[..len]` at `buf[len..len + 2]`.
pub(crate) fn write_crc(buf: &mut [u8], len: usize) {
    let crc = crc16(&buf[..len]);
    LittleEndian::write_u16(&mut buf[len..len + 2], crc);
}

/// Check the trailing CRC of a complete ADU.
pub fn verify_crc(adu_buf: &[u8]) -> Result<()> {
    if adu_buf.len() < 2 {
        return Err(Error::BufferSize);
    }
    let (data, crc_buf) = adu_buf.split_at(adu_buf.len() - 2);
    let expected_crc = LittleEndian::read_u16(crc_buf);
    let actual_crc = crc16(data);
    if expected_crc != actual_crc {
        return Err(Error::Crc(expected_crc, actual_crc));
    }
    Ok(())
}

/// Extract the PDU length out of the ADU response buffer.
///
/// Diagnostics responses echo the request and cannot be measured from
/// the response alone, see [`client::response_adu_len`].
pub fn response_pdu_len(adu_buf: &[u8]) -> Result<Option<usize>> {
    if adu_buf.len() < 2 {
        return Ok(None);
    }
    let fn_code = adu_buf[1];
    let len = match fn_code {
        0x01..=0x04 | 0x0C | 0x11 => {
            if adu_buf.len() > 2 {
                Some(2 + adu_buf[2] as usize)
            } else {
                // incomplete frame
                None
            }
        }
        0x05 | 0x06 | 0x0B | 0x0F | 0x10 => Some(5),
        0x07 | 0x80..=0xFF => Some(2),
        _ => return Err(Error::FnCode(fn_code)),
    };
    Ok(len)
}
