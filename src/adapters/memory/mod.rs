//! In-memory adapters for tests and single-process deployments.

mod trip_track_repository;

pub use trip_track_repository::InMemoryTripTrackRepository;
