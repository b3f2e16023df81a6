//! PostgreSQL-backed shared session store.
//!
//! One `presentation_session` row is the shared record every viewer of a
//! presentation observes. Publishes are plain `UPDATE`s; change
//! notifications ride `LISTEN/NOTIFY` through a row trigger that sends
//! the updated row as JSON.

pub mod pg_session_store;
pub mod schema;

pub use pg_session_store::PgSessionStore;
