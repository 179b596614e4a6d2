//! Shared helpers for unit tests that bind localhost sockets.

pub(crate) mod socket_guard;
