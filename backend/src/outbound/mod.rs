//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: credential stores (PostgreSQL via Diesel, in-memory)
//! - **password**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod password;
pub mod persistence;
