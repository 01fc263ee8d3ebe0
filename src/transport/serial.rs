// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serial port transport

use super::Transport;
use crate::codec::rtu::MAX_FRAME_LEN;
use serialport::{ClearBuffer, SerialPort};
use std::{
    io::{self, Read, Write},
    time::Duration,
};

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Serial transport errors.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("The device must be opened first")]
    NotOpen,
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("Serial I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Serial line configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device name (e.g. `/dev/ttyUSB0`, `COM3`)
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// How long the line may stay silent before a read is considered complete.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Create a new configuration for 8 data bits, no parity, one stop bit.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(100),
        }
    }

    #[must_use]
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    #[must_use]
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    #[must_use]
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    #[must_use]
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A [`Transport`] on top of a local serial port.
pub struct SerialTransport {
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a closed transport, the port is opened by [`Transport::open`].
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self { config, port: None }
    }

    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// `true` between a successful `open` and `close`.
    pub const fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialError> {
        self.port.as_mut().ok_or(SerialError::NotOpen)
    }
}

impl Transport for SerialTransport {
    type Error = SerialError;

    fn open(&mut self) -> Result<(), Self::Error> {
        if self.port.is_some() {
            #[cfg(feature = "log")]
            log::debug!("{} is already open", self.config.path);
            return Ok(());
        }
        let SerialConfig {
            path,
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            flow_control,
            timeout,
        } = &self.config;
        let port = serialport::new(path.as_str(), *baud_rate)
            .data_bits(*data_bits)
            .stop_bits(*stop_bits)
            .parity(*parity)
            .flow_control(*flow_control)
            .timeout(*timeout)
            .open()?;
        #[cfg(feature = "log")]
        log::debug!("Opened {path} at {baud_rate} baud");
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        if self.port.take().is_some() {
            #[cfg(feature = "log")]
            log::debug!("Closed {}", self.config.path);
        }
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        let port = self.port()?;
        // Leftovers of an earlier exchange would be taken for the next response.
        port.clear(ClearBuffer::Input)?;
        port.write_all(frame)?;
        port.flush()?;
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>, Self::Error> {
        let port = self.port()?;
        let mut received = Vec::new();
        let mut chunk = [0u8; MAX_FRAME_LEN];
        while received.len() < MAX_FRAME_LEN {
            match port.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => received.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(received)
    }
}
