pub mod auth_dto;
pub mod booking_dto;
pub mod calendar_dto;
pub mod catalog_dto;
pub mod chat_dto;
pub mod vendor_dto;
