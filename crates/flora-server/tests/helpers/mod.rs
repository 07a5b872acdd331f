//! Test helpers para flora-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod client;

pub use app::{DownStore, SECRET, TestApp, dictionary, sign_token};
pub use client::{TestClient, TestResponse};
