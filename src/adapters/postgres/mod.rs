//! PostgreSQL adapters - Database implementations for repository ports.

mod trip_track_repository;

pub use trip_track_repository::PostgresTripTrackRepository;
