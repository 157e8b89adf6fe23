pub mod account_service;
pub mod booking_service;
pub mod calendar_service;
pub mod catalog_service;
pub mod chat_hub;
pub mod chat_service;
pub mod discovery_service;
pub mod verification_service;
