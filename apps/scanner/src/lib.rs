// [apps/scanner/src/lib.rs]
pub mod bootstrap;
pub mod cli;
pub mod controller;
pub mod intake;
pub mod ports;
