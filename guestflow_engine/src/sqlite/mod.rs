//! SQLite database module for the Guestflow payment engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
