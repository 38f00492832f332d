//! Controllers del sistema
//!
//! Orquestan repositorios y el motor de elegibilidad. Reciben el AuthScope
//! explícito en cada operación.

pub mod application_controller;
pub mod broker_controller;
pub mod credential_controller;
pub mod driver_controller;
pub mod vehicle_controller;
