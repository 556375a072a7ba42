//! Minishop Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Flow
//!
//! Catalog → cart service → checkout → order store. The cart lives in the
//! visitor's session; [`services`] holds the cart and checkout logic written
//! against the [`services::Catalog`] and [`services::OrderStore`] traits, and
//! [`db`] implements those traits on `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
