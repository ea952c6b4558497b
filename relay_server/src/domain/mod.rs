pub mod config;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod resolver;
pub mod voucher;
