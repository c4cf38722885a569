#![forbid(unsafe_code)]

pub mod parking_cli;
