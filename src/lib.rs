#![feature(int_roundings)]

pub mod accounts;
pub mod api;
pub mod billing;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod observability;
pub mod state;
pub mod workflow;
