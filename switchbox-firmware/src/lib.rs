#![no_std]
//! Debounced button evaluation for the switchbox controller.
//!
//! Each poll cycle the [poller::Poller] samples the inputs into an [scan::InputState], advances
//! every unit in the [registry::UnitRegistry], collects one [button::Delta] per output and
//! queues the resulting events for the transport.

#[macro_use]
mod macros;

pub mod button;
pub mod layout;
pub mod poller;
pub mod registry;
pub mod reporter;
pub mod scan;
pub mod unit;

#[cfg(test)]
pub mod time_driver_test_stub;
