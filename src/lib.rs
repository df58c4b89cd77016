//! # zorvexra-api
//!
//! REST backend for Zorvexra. Users submit one GitHub project per week,
//! administrators review submissions, and approved projects earn ZorBits.
//! Approved projects appear on public portfolios and in a showcase where
//! other users buy them with ZorBits.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP + JSON)
//!     │
//!     ├── REST Handlers (api/)       extractors: AuthUser, AdminUser, ApiJson
//!     │
//!     ├── Services (service/)        accounts, submissions, portfolio,
//!     │                              marketplace, activity
//!     ├── Domain rules (domain/)     weekly window, awards, prices, templates
//!     │
//!     └── Store (persistence/)       PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod openapi;
pub mod persistence;
pub mod service;
