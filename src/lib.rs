//! Trip Tracker - real-time GPS tracking for delivery trips
//!
//! Consumes booking and runner events, keeps one versioned trip track per
//! booking, and fans every position update out to the observers connected
//! to that booking.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
