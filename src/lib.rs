#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod resolve;
pub mod select;
pub mod store;
