//! Business services

pub mod delivery;

pub use delivery::DeliveryService;
