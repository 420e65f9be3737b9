//! Concurrency infrastructure - bounded capacity for external calls

mod controller;

pub use controller::{
    ConcurrencyConfig, ConcurrencyController, InFlightToken, SlotClass, SlotUsage,
};
