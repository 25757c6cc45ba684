//! Small service-layer utilities shared by the ferrite client crates.

pub mod service;
