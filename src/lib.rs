// src/lib.rs

//! mensasync: canteen feed index synchronization engine.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
