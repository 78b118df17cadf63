//! Infrastructure adapters: concrete implementations of the ports against
//! the real database and the real file server.

pub mod ftp;
pub mod postgres;
