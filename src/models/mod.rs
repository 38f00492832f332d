//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod application;
pub mod assignment;
pub mod broker;
pub mod company;
pub mod credential;
pub mod driver;
pub mod user;
pub mod vehicle;
