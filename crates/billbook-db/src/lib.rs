//! Persistence layer for billbook: schema migrations, row models, and
//! per-table query functions over PostgreSQL.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
