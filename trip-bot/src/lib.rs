//! Suburban trip booking bot.
//!
//! Walks a user through choosing two stations and a train, records the
//! trip, and reminds them shortly before departure.

pub mod bot;
pub mod cache;
pub mod channel;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod provider;
pub mod schedule;
pub mod session;
pub mod stations;
pub mod store;
pub mod trips;
pub mod web;
