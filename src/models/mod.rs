pub mod account;
pub mod booking;
pub mod calendar_event;
pub mod message;
pub mod vendor_service;
pub mod verification;
