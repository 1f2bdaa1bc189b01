//! HTTP surface: routes and middleware

pub mod middleware;
pub mod services;
