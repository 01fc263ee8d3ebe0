// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod client;
mod codec;
mod error;
mod frame;
#[cfg(test)]
mod mock_transport;
pub mod transport;

pub use client::Client;
pub use codec::rtu;
pub use error::*;
pub use frame::*;
pub use transport::Transport;
