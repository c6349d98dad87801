//! Test doubles for the ports, shared with downstream crates through the
//! `testing` feature.
