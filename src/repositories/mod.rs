//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula las consultas SQL de una entidad. Los métodos
//! sobre `&self` usan el pool; las funciones asociadas que reciben
//! `&mut PgConnection` participan en transacciones de los services.

pub mod assignment_repository;
pub mod broker_repository;
pub mod company_repository;
pub mod credential_repository;
pub mod draft_repository;
pub mod driver_repository;
pub mod user_repository;
pub mod vehicle_repository;
