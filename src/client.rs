// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master).

use crate::{
    codec::rtu::{
        DecodedFrame, Header, MAX_FRAME_LEN, MIN_FRAME_LEN, RequestAdu, ResponseAdu, SlaveId,
        client::{decode_response, encode_request, response_adu_len},
    },
    error::{Error, Failure, ProtocolError},
    frame::*,
    transport::Transport,
};
use alloc::vec::Vec;

type Result<T, E> = core::result::Result<T, ProtocolError<E>>;

/// A synchronous Modbus RTU client on top of a [`Transport`].
///
/// Every operation is one request/response exchange: the request is sent,
/// the response is collected and validated and then decoded. Nothing is
/// retried and no state is kept between exchanges.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Create a client, the transport is not opened yet.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Open the underlying transport.
    pub fn open(&mut self) -> Result<(), T::Error> {
        self.transport.open().map_err(ProtocolError::transport)
    }

    /// Close the underlying transport.
    pub fn close(&mut self) -> Result<(), T::Error> {
        self.transport.close().map_err(ProtocolError::transport)
    }

    /// Access the transport, e.g. to inspect its configuration.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give up the client and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Read `quantity` coils starting at `address` (`0x01`).
    pub fn read_coils(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<ReadBits, T::Error> {
        self.decoded(station, Request::ReadCoils(address, quantity))
    }

    /// Like [`Client::read_coils`], but returns the verified response frame.
    pub fn read_coils_raw(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<u8>, T::Error> {
        self.call(station, Request::ReadCoils(address, quantity))
    }

    /// Read `quantity` discrete inputs starting at `address` (`0x02`).
    pub fn read_discrete_inputs(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<ReadBits, T::Error> {
        self.decoded(station, Request::ReadDiscreteInputs(address, quantity))
    }

    /// Like [`Client::read_discrete_inputs`], but returns the verified response frame.
    pub fn read_discrete_inputs_raw(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<u8>, T::Error> {
        self.call(station, Request::ReadDiscreteInputs(address, quantity))
    }

    /// Read `quantity` holding registers starting at `address` (`0x03`).
    pub fn read_holding_registers(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<ReadRegisters, T::Error> {
        self.decoded(station, Request::ReadHoldingRegisters(address, quantity))
    }

    /// Like [`Client::read_holding_registers`], but returns the verified response frame.
    pub fn read_holding_registers_raw(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<u8>, T::Error> {
        self.call(station, Request::ReadHoldingRegisters(address, quantity))
    }

    /// Read `quantity` input registers starting at `address` (`0x04`).
    pub fn read_input_registers(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<ReadRegisters, T::Error> {
        self.decoded(station, Request::ReadInputRegisters(address, quantity))
    }

    /// Like [`Client::read_input_registers`], but returns the verified response frame.
    pub fn read_input_registers_raw(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<u8>, T::Error> {
        self.call(station, Request::ReadInputRegisters(address, quantity))
    }

    /// Write a single coil.
    ///
    /// `value` goes on the wire unchanged, servers only accept `0xFF00` (on)
    /// and `0x0000` (off). See [`bool_to_u16_coil`].
    pub fn write_single_coil(
        &mut self,
        station: SlaveId,
        address: Address,
        value: Word,
    ) -> Result<WriteSingle, T::Error> {
        self.decoded(station, Request::WriteSingleCoil(address, value))
    }

    /// Write one holding register, the server echoes address and value.
    pub fn write_single_register(
        &mut self,
        station: SlaveId,
        address: Address,
        value: Word,
    ) -> Result<WriteSingle, T::Error> {
        self.decoded(station, Request::WriteSingleRegister(address, value))
    }

    /// Read the eight exception status outputs (`0x07`).
    pub fn read_exception_status(&mut self, station: SlaveId) -> Result<ExceptionStatus, T::Error> {
        self.decoded(station, Request::ReadExceptionStatus)
    }

    /// Run a diagnostics sub-function (`0x08`).
    ///
    /// Most sub-functions echo the request, the response keeps data words as received.
    pub fn diagnostics(
        &mut self,
        station: SlaveId,
        subfunction: SubFunctionCode,
        data: &[Word],
    ) -> Result<Diagnostics, T::Error> {
        self.decoded(station, Request::Diagnostics(subfunction, data))
    }

    /// Status word and event counter of the serial line (`0x0B`).
    pub fn get_comm_event_counter(
        &mut self,
        station: SlaveId,
    ) -> Result<CommEventCounter, T::Error> {
        self.decoded(station, Request::GetCommEventCounter)
    }

    /// Status, counters and the most recent communication events (`0x0C`).
    pub fn get_comm_event_log(&mut self, station: SlaveId) -> Result<CommEventLog, T::Error> {
        self.decoded(station, Request::GetCommEventLog)
    }

    /// Write `coils.len()` coils starting at `address`.
    ///
    /// Fails without touching the transport unless `coils` holds exactly
    /// `quantity` values. Returns the verified response frame.
    pub fn write_multiple_coils(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
        coils: &[Coil],
    ) -> Result<Vec<u8>, T::Error> {
        check_argument_count::<T::Error>(quantity, coils.len())?;
        self.call(station, Request::WriteMultipleCoils(address, coils))
    }

    /// Write `words.len()` holding registers starting at `address`.
    ///
    /// Fails without touching the transport unless `words` holds exactly
    /// `quantity` values. Returns the verified response frame.
    pub fn write_multiple_registers(
        &mut self,
        station: SlaveId,
        address: Address,
        quantity: Quantity,
        words: &[Word],
    ) -> Result<Vec<u8>, T::Error> {
        check_argument_count::<T::Error>(quantity, words.len())?;
        self.call(station, Request::WriteMultipleRegisters(address, words))
    }

    /// Returns the verified response frame, the server ID bytes are device specific.
    pub fn report_server_id(&mut self, station: SlaveId) -> Result<Vec<u8>, T::Error> {
        self.call(station, Request::ReportServerId)
    }

    /// Send any request and return the verified response frame
    /// (station, function code, payload and CRC).
    pub fn call(&mut self, station: SlaveId, request: Request<'_>) -> Result<Vec<u8>, T::Error> {
        self.exchange(station, request, |_, adu| Ok(adu.to_vec()))
    }

    fn decoded<R>(&mut self, station: SlaveId, request: Request<'_>) -> Result<R, T::Error>
    where
        R: for<'a> TryFrom<DecodedFrame<'a>, Error = Error>,
    {
        self.exchange(station, request, |frame, _| R::try_from(frame))
    }

    fn exchange<R, F>(
        &mut self,
        station: SlaveId,
        request: Request<'_>,
        decode: F,
    ) -> Result<R, T::Error>
    where
        F: FnOnce(DecodedFrame<'_>, &[u8]) -> core::result::Result<R, Error>,
    {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let adu = RequestAdu {
            hdr: Header { slave: station },
            pdu: RequestPdu(request),
        };
        let len = encode_request(adu, &mut buf)
            .map_err(|err| ProtocolError::<T::Error>::local(Failure::InvalidRequest(err)))?;
        let request_adu = &buf[..len];

        #[cfg(feature = "log")]
        log::debug!(
            "Sending request to station {station}: {}",
            hex::encode(request_adu)
        );
        self.transport
            .send(request_adu)
            .map_err(|err| ProtocolError::transport(err).with_request(request_adu))?;
        let response = self
            .receive(&request)
            .map_err(|err| ProtocolError::transport(err).with_request(request_adu))?;
        #[cfg(feature = "log")]
        log::debug!("Received response: {}", hex::encode(&response));

        let captured =
            |err: ProtocolError<T::Error>| err.with_request(request_adu).with_response(&response);

        let function = FunctionCode::from(request);
        match decode_response(function, &response) {
            Ok(ResponseAdu {
                hdr,
                pdu: ResponsePdu(Ok(pdu)),
            }) => {
                #[cfg(feature = "log")]
                if hdr.slave != station {
                    log::warn!(
                        "Response from station {} to a request for station {station}",
                        hdr.slave
                    );
                }
                let frame = DecodedFrame {
                    slave: hdr.slave,
                    pdu,
                };
                decode(frame, &response).map_err(|err| {
                    #[cfg(feature = "log")]
                    log::error!("Failed to decode {function} response: {err}");
                    captured(ProtocolError::local(Failure::MalformedResponse(err)))
                })
            }
            Ok(ResponseAdu {
                pdu: ResponsePdu(Err(exception)),
                ..
            }) => {
                #[cfg(feature = "log")]
                log::warn!(
                    "Station {station} rejected function {}: {}",
                    exception.function,
                    Exception::describe(exception.code)
                );
                Err(captured(ProtocolError::device(exception.code)))
            }
            Err(err) => {
                #[cfg(feature = "log")]
                log::warn!("Invalid response to function {function}: {err}");
                let failure = match err {
                    Error::BufferSize if response.len() < MIN_FRAME_LEN => {
                        Failure::ResponseTooShort(response.len())
                    }
                    Error::FnCode(fn_code) => Failure::IllegalErrorCode(fn_code),
                    Error::Crc(expected, actual) => Failure::ErrorCheck { expected, actual },
                    err => Failure::MalformedResponse(err),
                };
                Err(captured(ProtocolError::local(failure)))
            }
        }
    }

    /// Collect response bytes until a complete frame for `request` arrived,
    /// the line went idle or the RTU frame limit is reached.
    fn receive(&mut self, request: &Request<'_>) -> core::result::Result<Vec<u8>, T::Error> {
        let mut response = Vec::new();
        loop {
            let chunk = self.transport.read()?;
            if chunk.is_empty() {
                break;
            }
            response.extend_from_slice(&chunk);
            if response.len() >= MAX_FRAME_LEN {
                response.truncate(MAX_FRAME_LEN);
                break;
            }
            // Frames of unknown length are read until the line goes idle.
            let expected = response_adu_len(request, &response);
            if matches!(expected, Ok(Some(len)) if response.len() >= len) {
                break;
            }
        }
        Ok(response)
    }
}

fn check_argument_count<E>(quantity: Quantity, actual: usize) -> Result<(), E>
where
    E: core::error::Error + 'static,
{
    if usize::from(quantity) != actual {
        #[cfg(feature = "log")]
        log::warn!("Expected {quantity} values, got {actual}");
        return Err(ProtocolError::local(Failure::ArgumentCount {
            expected: quantity,
            actual,
        }));
    }
    Ok(())
}
