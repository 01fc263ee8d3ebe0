// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*};
use alloc::vec::Vec;
use byteorder::{BigEndian, ByteOrder};

pub mod rtu;

use self::rtu::DecodedFrame;

type Result<T> = core::result::Result<T, Error>;

impl TryFrom<u8> for Exception {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        use crate::frame::Exception::*;
        let ex = match code {
            0x00 => UndefinedFailure,
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            _ => {
                return Err(Error::ExceptionCode(code));
            }
        };
        Ok(ex)
    }
}

impl TryFrom<&[u8]> for ExceptionResponse {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::BufferSize);
        }
        let fn_err_code = bytes[0];
        if fn_err_code < 0x80 {
            return Err(Error::ExceptionFnCode(fn_err_code));
        }
        let function = (fn_err_code - 0x80).into();
        Ok(ExceptionResponse {
            function,
            code: bytes[1],
        })
    }
}

impl Request<'_> {
    /// Serialize the PDU (function code and payload) into `buf`.
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.pdu_len();
        if buf.len() < len {
            return Err(Error::BufferSize);
        }
        buf[0] = FunctionCode::from(*self).value();
        match *self {
            Self::ReadCoils(address, value)
            | Self::ReadDiscreteInputs(address, value)
            | Self::ReadHoldingRegisters(address, value)
            | Self::ReadInputRegisters(address, value)
            | Self::WriteSingleCoil(address, value)
            | Self::WriteSingleRegister(address, value) => {
                BigEndian::write_u16(&mut buf[1..3], address);
                BigEndian::write_u16(&mut buf[3..5], value);
            }
            Self::ReadExceptionStatus
            | Self::GetCommEventCounter
            | Self::GetCommEventLog
            | Self::ReportServerId => {}
            Self::Diagnostics(subfunction, words) => {
                BigEndian::write_u16(&mut buf[1..3], subfunction);
                write_words(words, &mut buf[3..len]);
            }
            Self::WriteMultipleCoils(address, coils) => {
                let quantity = checked_quantity(coils.len())?;
                let byte_count = checked_byte_count(packed_coils_len(coils.len()))?;
                BigEndian::write_u16(&mut buf[1..3], address);
                BigEndian::write_u16(&mut buf[3..5], quantity);
                buf[5] = byte_count;
                pack_coils(coils, &mut buf[6..len])?;
            }
            Self::WriteMultipleRegisters(address, words) => {
                let quantity = checked_quantity(words.len())?;
                let byte_count = checked_byte_count(words.len() * 2)?;
                BigEndian::write_u16(&mut buf[1..3], address);
                BigEndian::write_u16(&mut buf[3..5], quantity);
                buf[5] = byte_count;
                write_words(words, &mut buf[6..len]);
            }
        }
        Ok(len)
    }
}

fn write_words(words: &[Word], buf: &mut [u8]) {
    debug_assert!(buf.len() >= words.len() * 2);
    for (i, w) in words.iter().enumerate() {
        BigEndian::write_u16(&mut buf[i * 2..], *w);
    }
}

fn read_words(bytes: &[u8]) -> Vec<Word> {
    bytes.chunks_exact(2).map(BigEndian::read_u16).collect()
}

fn checked_quantity(len: usize) -> Result<Quantity> {
    Quantity::try_from(len).map_err(|_| Error::BufferSize)
}

fn checked_byte_count(len: usize) -> Result<u8> {
    u8::try_from(len).map_err(|_| Error::BufferSize)
}

/// Split a PDU into its function code and payload after checking the minimum length.
fn payload<'a>(pdu: &'a [u8], expected: FunctionCode, min_len: usize) -> Result<&'a [u8]> {
    let Some((&fn_code, payload)) = pdu.split_first() else {
        return Err(Error::BufferSize);
    };
    if fn_code != expected.value() {
        return Err(Error::FnCode(fn_code));
    }
    if pdu.len() < min_len {
        return Err(Error::BufferSize);
    }
    Ok(payload)
}

/// Payload bytes announced by the leading byte count.
fn counted<'a>(payload: &'a [u8]) -> Result<(u8, &'a [u8])> {
    let byte_count = payload[0];
    let end = 1 + usize::from(byte_count);
    if payload.len() < end {
        return Err(Error::ByteCount(byte_count));
    }
    Ok((byte_count, &payload[1..end]))
}

fn read_bits(frame: DecodedFrame<'_>, function: FunctionCode) -> Result<ReadBits> {
    let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
    let (byte_count, bits) = counted(payload)?;
    Ok(ReadBits {
        station: frame.slave,
        function,
        byte_count,
        bits: bits.to_vec(),
    })
}

fn read_registers(frame: DecodedFrame<'_>, function: FunctionCode) -> Result<ReadRegisters> {
    let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
    let (byte_count, data) = counted(payload)?;
    if byte_count % 2 != 0 {
        return Err(Error::ByteCount(byte_count));
    }
    Ok(ReadRegisters {
        station: frame.slave,
        function,
        byte_count,
        registers: read_words(data),
    })
}

impl<'r> TryFrom<DecodedFrame<'r>> for ReadBits {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        match frame.function() {
            f @ (FunctionCode::ReadCoils | FunctionCode::ReadDiscreteInputs) => read_bits(frame, f),
            f => Err(Error::FnCode(f.value())),
        }
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for ReadRegisters {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        match frame.function() {
            f @ (FunctionCode::ReadHoldingRegisters | FunctionCode::ReadInputRegisters) => {
                read_registers(frame, f)
            }
            f => Err(Error::FnCode(f.value())),
        }
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for WriteSingle {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        let function = match frame.function() {
            f @ (FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister) => f,
            f => return Err(Error::FnCode(f.value())),
        };
        let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
        Ok(WriteSingle {
            station: frame.slave,
            function,
            address: BigEndian::read_u16(&payload[0..2]),
            value: BigEndian::read_u16(&payload[2..4]),
        })
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for ExceptionStatus {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        let function = FunctionCode::ReadExceptionStatus;
        let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
        Ok(ExceptionStatus {
            station: frame.slave,
            function,
            data: payload[0],
        })
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for Diagnostics {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        let function = FunctionCode::Diagnostics;
        let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
        let (subfunction, data) = payload.split_at(2);
        if data.len() % 2 != 0 {
            return Err(Error::BufferSize);
        }
        Ok(Diagnostics {
            station: frame.slave,
            function,
            subfunction: BigEndian::read_u16(subfunction),
            data: read_words(data),
        })
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for CommEventCounter {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        let function = FunctionCode::GetCommEventCounter;
        let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
        Ok(CommEventCounter {
            station: frame.slave,
            function,
            status: BigEndian::read_u16(&payload[0..2]),
            event_count: BigEndian::read_u16(&payload[2..4]),
        })
    }
}

impl<'r> TryFrom<DecodedFrame<'r>> for CommEventLog {
    type Error = Error;

    fn try_from(frame: DecodedFrame<'r>) -> Result<Self> {
        let function = FunctionCode::GetCommEventLog;
        let payload = payload(frame.pdu, function, min_response_pdu_len(function))?;
        let (byte_count, data) = counted(payload)?;
        if data.len() < 6 {
            return Err(Error::ByteCount(byte_count));
        }
        Ok(CommEventLog {
            station: frame.slave,
            function,
            byte_count,
            status: BigEndian::read_u16(&data[0..2]),
            event_count: BigEndian::read_u16(&data[2..4]),
            message_count: BigEndian::read_u16(&data[4..6]),
            events: data[6..].to_vec(),
        })
    }
}

fn min_response_pdu_len(fn_code: FunctionCode) -> usize {
    use FunctionCode::*;
    match fn_code {
        ReadCoils | ReadDiscreteInputs | ReadInputRegisters | ReadHoldingRegisters => 2,
        ReadExceptionStatus => 2,
        Diagnostics => 3,
        WriteSingleCoil | WriteSingleRegister | GetCommEventCounter => 5,
        WriteMultipleCoils | WriteMultipleRegisters => 5,
        GetCommEventLog => 8,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_from_code() {
        assert_eq!(
            Exception::try_from(0x00).unwrap(),
            Exception::UndefinedFailure
        );
        assert_eq!(
            Exception::try_from(0x06).unwrap(),
            Exception::ServerDeviceBusy
        );
        assert_eq!(
            Exception::try_from(0x0A).unwrap(),
            Exception::GatewayPathUnavailable
        );
        assert_eq!(
            Exception::try_from(0x07).err().unwrap(),
            Error::ExceptionCode(0x07)
        );
    }

    #[test]
    fn exception_response_from_bytes() {
        let data: &[u8] = &[0x79, 0x02];
        assert!(ExceptionResponse::try_from(data).is_err());

        let data: &[u8] = &[0x83];
        assert_eq!(
            ExceptionResponse::try_from(data).err().unwrap(),
            Error::BufferSize
        );

        let bytes: &[u8] = &[0x83, 0x02];
        let rsp = ExceptionResponse::try_from(bytes).unwrap();
        assert_eq!(
            rsp,
            ExceptionResponse {
                function: FunctionCode::ReadHoldingRegisters,
                code: 0x02,
            }
        );
        assert_eq!(rsp.exception(), Exception::IllegalDataAddress);
    }

    #[test]
    fn test_min_response_pdu_len() {
        use FunctionCode::*;

        assert_eq!(min_response_pdu_len(ReadCoils), 2);
        assert_eq!(min_response_pdu_len(ReadDiscreteInputs), 2);
        assert_eq!(min_response_pdu_len(ReadInputRegisters), 2);
        assert_eq!(min_response_pdu_len(ReadHoldingRegisters), 2);
        assert_eq!(min_response_pdu_len(WriteSingleCoil), 5);
        assert_eq!(min_response_pdu_len(WriteSingleRegister), 5);
        assert_eq!(min_response_pdu_len(GetCommEventCounter), 5);
        assert_eq!(min_response_pdu_len(GetCommEventLog), 8);
        assert_eq!(min_response_pdu_len(ReportServerId), 1);
    }

    mod serialize_requests {
        use super::*;

        fn encode(req: Request<'_>) -> Vec<u8> {
            let mut buf = [0u8; 64];
            let len = req.encode(&mut buf).unwrap();
            buf[..len].to_vec()
        }

        #[test]
        fn too_small_buffer() {
            let buf = &mut [0u8; 4];
            assert_eq!(
                Request::ReadCoils(0, 1).encode(buf).err().unwrap(),
                Error::BufferSize
            );
        }

        #[test]
        fn read_requests() {
            assert_eq!(
                encode(Request::ReadCoils(0x13, 0x13)),
                &[0x01, 0x00, 0x13, 0x00, 0x13]
            );
            assert_eq!(
                encode(Request::ReadDiscreteInputs(0xC4, 0x16)),
                &[0x02, 0x00, 0xC4, 0x00, 0x16]
            );
            assert_eq!(
                encode(Request::ReadHoldingRegisters(0x006B, 3)),
                &[0x03, 0x00, 0x6B, 0x00, 0x03]
            );
            assert_eq!(
                encode(Request::ReadInputRegisters(0x08, 1)),
                &[0x04, 0x00, 0x08, 0x00, 0x01]
            );
        }

        #[test]
        fn write_single_coil_passes_value_through() {
            assert_eq!(
                encode(Request::WriteSingleCoil(0xAC, 0xFF00)),
                &[0x05, 0x00, 0xAC, 0xFF, 0x00]
            );
            assert_eq!(
                encode(Request::WriteSingleCoil(0xAC, 0x1234)),
                &[0x05, 0x00, 0xAC, 0x12, 0x34]
            );
        }

        #[test]
        fn write_single_register() {
            assert_eq!(
                encode(Request::WriteSingleRegister(0x07, 0xABCD)),
                &[0x06, 0x00, 0x07, 0xAB, 0xCD]
            );
        }

        #[test]
        fn requests_without_payload() {
            assert_eq!(encode(Request::ReadExceptionStatus), &[0x07]);
            assert_eq!(encode(Request::GetCommEventCounter), &[0x0B]);
            assert_eq!(encode(Request::GetCommEventLog), &[0x0C]);
            assert_eq!(encode(Request::ReportServerId), &[0x11]);
        }

        #[test]
        fn diagnostics() {
            assert_eq!(
                encode(Request::Diagnostics(0x0000, &[])),
                &[0x08, 0x00, 0x00]
            );
            assert_eq!(
                encode(Request::Diagnostics(0x0000, &[0xA537, 0x0102])),
                &[0x08, 0x00, 0x00, 0xA5, 0x37, 0x01, 0x02]
            );
        }

        #[test]
        fn write_multiple_coils() {
            let coils = [
                true, false, true, true, false, false, true, true, true, false,
            ];
            assert_eq!(
                encode(Request::WriteMultipleCoils(0x13, &coils)),
                &[0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01]
            );
        }

        #[test]
        fn write_multiple_registers() {
            assert_eq!(
                encode(Request::WriteMultipleRegisters(0x01, &[0x000A, 0x0102])),
                &[0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]
            );
        }

        #[test]
        fn write_multiple_registers_byte_count_overflow() {
            let words = [0u16; 128];
            let buf = &mut [0u8; 300];
            assert_eq!(
                Request::WriteMultipleRegisters(0, &words)
                    .encode(buf)
                    .err()
                    .unwrap(),
                Error::BufferSize
            );
        }
    }

    mod deserialize_responses {
        use super::*;

        fn frame(pdu: &[u8]) -> DecodedFrame<'_> {
            DecodedFrame { slave: 0x01, pdu }
        }

        #[test]
        fn read_coils() {
            let rsp = ReadBits::try_from(frame(&[0x01, 0x03, 0xCD, 0x6B, 0x05])).unwrap();
            assert_eq!(rsp.station, 0x01);
            assert_eq!(rsp.function, FunctionCode::ReadCoils);
            assert_eq!(rsp.byte_count, 3);
            assert_eq!(rsp.bits, &[0xCD, 0x6B, 0x05]);
        }

        #[test]
        fn read_discrete_inputs() {
            let rsp = ReadBits::try_from(frame(&[0x02, 0x03, 0xAC, 0xDB, 0x35])).unwrap();
            assert_eq!(rsp.function, FunctionCode::ReadDiscreteInputs);
            assert_eq!(rsp.bits, &[0xAC, 0xDB, 0x35]);
        }

        #[test]
        fn read_bits_with_short_payload() {
            assert_eq!(
                ReadBits::try_from(frame(&[0x01, 0x03, 0xCD]))
                    .err()
                    .unwrap(),
                Error::ByteCount(3)
            );
            assert_eq!(
                ReadBits::try_from(frame(&[0x01])).err().unwrap(),
                Error::BufferSize
            );
        }

        #[test]
        fn read_registers() {
            let rsp =
                ReadRegisters::try_from(frame(&[0x03, 0x04, 0x00, 0x0A, 0x00, 0x14])).unwrap();
            assert_eq!(rsp.function, FunctionCode::ReadHoldingRegisters);
            assert_eq!(rsp.byte_count, 4);
            assert_eq!(rsp.registers, &[10, 20]);

            let rsp = ReadRegisters::try_from(frame(&[0x04, 0x02, 0x00, 0x0A])).unwrap();
            assert_eq!(rsp.function, FunctionCode::ReadInputRegisters);
            assert_eq!(rsp.registers, &[10]);
        }

        #[test]
        fn read_registers_never_pads_missing_values() {
            assert_eq!(
                ReadRegisters::try_from(frame(&[0x03, 0x04, 0x00, 0x0A]))
                    .err()
                    .unwrap(),
                Error::ByteCount(4)
            );
            assert_eq!(
                ReadRegisters::try_from(frame(&[0x03, 0x03, 0x00, 0x0A, 0x00]))
                    .err()
                    .unwrap(),
                Error::ByteCount(3)
            );
        }

        #[test]
        fn wrong_function_code() {
            assert_eq!(
                ReadRegisters::try_from(frame(&[0x01, 0x02, 0x00, 0x0A]))
                    .err()
                    .unwrap(),
                Error::FnCode(0x01)
            );
            assert_eq!(
                CommEventCounter::try_from(frame(&[0x0C, 0x00, 0x00, 0x00, 0x00]))
                    .err()
                    .unwrap(),
                Error::FnCode(0x0C)
            );
        }

        #[test]
        fn write_single() {
            let rsp = WriteSingle::try_from(frame(&[0x05, 0x00, 0xAC, 0xFF, 0x00])).unwrap();
            assert_eq!(rsp.function, FunctionCode::WriteSingleCoil);
            assert_eq!(rsp.address, 0xAC);
            assert_eq!(rsp.value, 0xFF00);

            let rsp = WriteSingle::try_from(frame(&[0x06, 0x00, 0x01, 0x00, 0x03])).unwrap();
            assert_eq!(rsp.function, FunctionCode::WriteSingleRegister);
            assert_eq!(rsp.address, 0x01);
            assert_eq!(rsp.value, 0x03);

            assert_eq!(
                WriteSingle::try_from(frame(&[0x06, 0x00, 0x01, 0x00]))
                    .err()
                    .unwrap(),
                Error::BufferSize
            );
        }

        #[test]
        fn exception_status() {
            let rsp = ExceptionStatus::try_from(frame(&[0x07, 0x6D])).unwrap();
            assert_eq!(rsp.data, 0x6D);
            assert!(ExceptionStatus::try_from(frame(&[0x07])).is_err());
        }

        #[test]
        fn diagnostics() {
            let rsp = Diagnostics::try_from(frame(&[0x08, 0x00, 0x00, 0xA5, 0x37])).unwrap();
            assert_eq!(rsp.subfunction, 0x0000);
            assert_eq!(rsp.data, &[0xA537]);

            let rsp = Diagnostics::try_from(frame(&[0x08, 0x00, 0x0A])).unwrap();
            assert_eq!(rsp.subfunction, 0x000A);
            assert!(rsp.data.is_empty());

            assert!(
                Diagnostics::try_from(frame(&[0x08, 0x00, 0x00, 0xA5])).is_err()
            );
        }

        #[test]
        fn comm_event_counter() {
            let rsp =
                CommEventCounter::try_from(frame(&[0x0B, 0xFF, 0xFF, 0x01, 0x08])).unwrap();
            assert_eq!(rsp.status, 0xFFFF);
            assert_eq!(rsp.event_count, 0x0108);
        }

        #[test]
        fn comm_event_log() {
            let rsp = CommEventLog::try_from(frame(&[
                0x0C, 0x08, 0x00, 0x00, 0x01, 0x08, 0x01, 0x21, 0x20, 0x00,
            ]))
            .unwrap();
            assert_eq!(rsp.byte_count, 8);
            assert_eq!(rsp.status, 0x0000);
            assert_eq!(rsp.event_count, 0x0108);
            assert_eq!(rsp.message_count, 0x0121);
            assert_eq!(rsp.events, &[0x20, 0x00]);
        }

        #[test]
        fn comm_event_log_with_short_byte_count() {
            assert_eq!(
                CommEventLog::try_from(frame(&[0x0C, 0x04, 0x00, 0x00, 0x01, 0x08, 0x01, 0x21]))
                    .err()
                    .unwrap(),
                Error::ByteCount(4)
            );
        }
    }
}
