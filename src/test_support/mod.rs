//! Helpers shared by unit tests across the library.

pub mod socket_guard;
