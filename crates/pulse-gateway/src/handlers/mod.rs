//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod admin;
pub mod command;
pub mod health;
