// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The byte transport underneath the RTU client.

use alloc::vec::Vec;

#[cfg(feature = "serial")]
mod serial;

#[cfg(feature = "serial")]
pub use self::serial::*;

/// A half-duplex byte stream to the bus, usually a serial line.
///
/// Line settings and timeouts are the transport's business: the client
/// only hands over complete request frames and collects whatever comes back.
pub trait Transport {
    type Error: core::error::Error + 'static;

    /// Acquire the line, opening an already opened transport is not an error.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Release the line.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Transmit a complete frame, blocking until it has been written.
    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Return the bytes received until the line went idle.
    ///
    /// An empty result means nothing more arrived within the transport's timeout.
    fn read(&mut self) -> Result<Vec<u8>, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        (**self).send(frame)
    }

    fn read(&mut self) -> Result<Vec<u8>, Self::Error> {
        (**self).read()
    }
}
