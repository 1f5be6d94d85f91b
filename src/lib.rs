#![deny(clippy::all)]
#![forbid(unsafe_code)]

// FIXME: When derive_builder supports Rust 2018 syntax switch to a local import
#[macro_use]
extern crate derive_builder;

pub mod coord;
pub mod csv_data;
pub mod error;
pub mod expand;
pub mod geo;
pub mod nav;
pub mod resolve;
pub mod route;
pub mod segment;
pub mod token;

pub use error::{Error, Result, RouteIssue};
pub use nav::NavData;
pub use route::{interpret, RouteLine};
