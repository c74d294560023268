//! Infrastructure layer - storage backends, credentials and services

pub mod auth;
pub mod cart;
pub mod logging;
pub mod member;
pub mod storage;
