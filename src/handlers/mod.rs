pub mod admin;
pub mod auctions;
pub mod auth;
pub mod extract;
pub mod health;
pub mod i18n;
pub mod payments;
pub mod resources;
pub mod search;
pub mod services;
pub mod uploads;
