// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted [`Transport`] used by the unit tests to emulate a bus.

use crate::transport::Transport;
use alloc::{collections::VecDeque, vec::Vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MockTransportError {
    #[error("Transport is not open")]
    NotOpen,
    #[error("Simulated write failure")]
    Write,
    #[error("Simulated read failure")]
    Read,
}

/// Emulated bus: every `read` hands out the next scripted chunk.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    /// Frames handed to `send`, one entry per call
    sent: Vec<Vec<u8>>,
    /// Pending response chunks, an exhausted queue reads as an idle line
    chunks: VecDeque<Vec<u8>>,
    reads: usize,
    should_error_on_write: bool,
    should_error_on_read: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// An opened transport that will answer with `response` in one chunk.
    pub fn responding(response: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.open = true;
        transport.push_response(response);
        transport
    }

    /// Queue one chunk for a future `read`.
    pub fn push_response(&mut self, chunk: &[u8]) {
        self.chunks.push_back(chunk.to_vec());
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Number of `read` calls so far.
    pub const fn reads(&self) -> usize {
        self.reads
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

impl Transport for MockTransport {
    type Error = MockTransportError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.open = false;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if !self.open {
            return Err(MockTransportError::NotOpen);
        }
        if self.should_error_on_write {
            return Err(MockTransportError::Write);
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>, Self::Error> {
        if !self.open {
            return Err(MockTransportError::NotOpen);
        }
        if self.should_error_on_read {
            return Err(MockTransportError::Read);
        }
        self.reads += 1;
        Ok(self.chunks.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn read_scripted_chunks_then_idle() {
        let mut transport = MockTransport::responding(&[0x01, 0x03]);
        transport.push_response(&[0x04]);
        assert_eq!(transport.read().unwrap(), &[0x01, 0x03]);
        assert_eq!(transport.read().unwrap(), &[0x04]);
        assert!(transport.read().unwrap().is_empty());
        assert_eq!(transport.reads(), 3);
    }

    #[test]
    fn record_sent_frames() {
        let mut transport = MockTransport::new();
        transport.open().unwrap();
        transport.send(&[0x01, 0x07]).unwrap();
        transport.send(&[0x01, 0x11]).unwrap();
        assert_eq!(transport.sent(), &[vec![0x01, 0x07], vec![0x01, 0x11]]);
    }

    #[test]
    fn closed_transport_fails() {
        let mut transport = MockTransport::new();
        assert_eq!(transport.send(&[0x01]), Err(MockTransportError::NotOpen));
        assert_eq!(transport.read(), Err(MockTransportError::NotOpen));
        transport.open().unwrap();
        assert!(transport.is_open());
        transport.close().unwrap();
        assert!(!transport.is_open());
    }

    #[test]
    fn simulated_errors() {
        let mut transport = MockTransport::responding(&[0x01]);
        transport.set_write_error(true);
        assert_eq!(transport.send(&[0x01]), Err(MockTransportError::Write));
        assert!(transport.sent().is_empty());
        transport.set_read_error(true);
        assert_eq!(transport.read(), Err(MockTransportError::Read));
        transport.set_read_error(false);
        assert_eq!(transport.read().unwrap(), &[0x01]);
    }
}
