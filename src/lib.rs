// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod bridge;
pub mod cli;
pub mod diagnose;
pub mod keep;
pub mod status;
