pub mod config;
pub mod network;
pub mod session;
pub mod storage;
