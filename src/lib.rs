pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    account_service::AccountService, booking_service::BookingService,
    calendar_service::CalendarService, catalog_service::CatalogService, chat_hub::ChatHub,
    chat_service::ChatService, discovery_service::DiscoveryService,
    verification_service::VerificationService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub account_service: AccountService,
    pub catalog_service: CatalogService,
    pub booking_service: BookingService,
    pub calendar_service: CalendarService,
    pub verification_service: VerificationService,
    pub discovery_service: DiscoveryService,
    pub chat_service: ChatService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let hub = ChatHub::default();

        Self {
            account_service: AccountService::new(pool.clone()),
            catalog_service: CatalogService::new(pool.clone()),
            booking_service: BookingService::new(pool.clone()),
            calendar_service: CalendarService::new(pool.clone()),
            verification_service: VerificationService::new(
                pool.clone(),
                &config.uploads_dir,
                config.max_upload_bytes,
            ),
            discovery_service: DiscoveryService::new(pool.clone()),
            chat_service: ChatService::new(pool.clone(), hub),
            pool,
        }
    }
}
