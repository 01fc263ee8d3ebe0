// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
pub fn encode_request(adu: RequestAdu, buf: &mut [u8]) -> Result<usize> {
    let RequestAdu { hdr, pdu } = adu;
    if buf.len() < 2 {
        return Err(Error::BufferSize);
    }
    let len = pdu.0.encode(&mut buf[1..])?;
    if buf.len() < len + 3 {
        return Err(Error::BufferSize);
    }
    buf[0] = hdr.slave;
    write_crc(buf, len + 1);
    Ok(len + 3)
}

/// Expected length of the complete response ADU to `request`.
///
/// Returns `None` as long as too few bytes arrived to tell.
pub fn response_adu_len(request: &Request<'_>, adu_buf: &[u8]) -> Result<Option<usize>> {
    let is_echo = adu_buf.get(1) == Some(&FunctionCode::Diagnostics.value());
    if matches!(request, Request::Diagnostics(_, _)) && is_echo {
        return Ok(Some(request.pdu_len() + 3));
    }
    Ok(response_pdu_len(adu_buf)?.map(|pdu_len| pdu_len + 3))
}

/// Validate a received RTU response to a request with `function`.
///
/// The whole buffer is treated as one frame: the trailing two bytes are the CRC.
/// An exception frame is recognized by its function byte before the CRC is
/// checked and must be exactly [`EXCEPTION_FRAME_LEN`] bytes long.
pub fn decode_response(function: FunctionCode, buf: &[u8]) -> Result<ResponseAdu<'_>> {
    if buf.len() < MIN_FRAME_LEN {
        return Err(Error::BufferSize);
    }
    let hdr = Header { slave: buf[0] };
    let fn_code = buf[1];
    if fn_code != function.value() {
        if fn_code != function.exception_value() {
            return Err(Error::FnCode(fn_code));
        }
        if buf.len() != EXCEPTION_FRAME_LEN {
            return Err(Error::BufferSize);
        }
        let exception = ExceptionResponse::try_from(&buf[1..])?;
        return Ok(ResponseAdu {
            hdr,
            pdu: ResponsePdu(Err(exception)),
        });
    }
    verify_crc(buf)?;
    Ok(ResponseAdu {
        hdr,
        pdu: ResponsePdu(Ok(&buf[1..buf.len() - 2])),
    })
}
