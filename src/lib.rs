//! FSP Portal - website and admin backend of a regional sports federation
//!
//! This library provides the REST API, the public pages and the admin client.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod site;
pub mod views;
