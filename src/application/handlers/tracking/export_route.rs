//! ExportRouteHandler - a trip's path as a GeoJSON LineString.
//!
//! The storage engine builds the geometry when it can. Otherwise the
//! LineString is assembled from the ordered waypoints.

use std::sync::Arc;

use crate::domain::foundation::{BookingId, TripTrackId};
use crate::domain::tracking::{line_string_geojson, TrackingError};
use crate::ports::TripTrackRepository;

#[derive(Debug, Clone)]
pub struct ExportRouteQuery {
    pub booking_id: BookingId,
}

pub struct ExportRouteHandler {
    repository: Arc<dyn TripTrackRepository>,
}

impl ExportRouteHandler {
    pub fn new(repository: Arc<dyn TripTrackRepository>) -> Self {
        Self { repository }
    }

    /// Route of the booking's track.
    pub async fn handle(&self, query: ExportRouteQuery) -> Result<String, TrackingError> {
        let track = self
            .repository
            .find_by_booking_id(&query.booking_id)
            .await?
            .ok_or_else(|| TrackingError::not_found_for_booking(&query.booking_id))?;

        self.export_track_route(track.id()).await
    }

    /// Route of a track by id. A track without waypoints yields an empty LineString.
    pub async fn export_track_route(&self, track_id: &TripTrackId) -> Result<String, TrackingError> {
        match self.repository.route_geometry(track_id).await {
            Ok(Some(geometry)) => return Ok(geometry),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(track_id = %track_id, error = %e, "Native route geometry failed, building manually");
            }
        }

        let waypoints = self.repository.list_waypoints(track_id).await?;
        Ok(line_string_geojson(&waypoints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::memory::InMemoryTripTrackRepository;
    use crate::domain::foundation::{DomainError, ErrorCode, RunnerId, Timestamp};
    use crate::domain::tracking::{TripTrack, Waypoint, EMPTY_LINE_STRING};

    #[tokio::test]
    async fn builds_line_string_from_waypoints() {
        let repo = Arc::new(InMemoryTripTrackRepository::new());
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        repo.save(&track).await.unwrap();
        let start = Timestamp::now();
        for (i, lon) in [1.0, 2.0].into_iter().enumerate() {
            let wp = Waypoint::new(1.0, lon, 0.0, 0.0, start.plus_secs(i as i64)).unwrap();
            repo.append_waypoint(track.id(), &wp).await.unwrap();
        }

        let geojson = ExportRouteHandler::new(repo)
            .handle(ExportRouteQuery {
                booking_id: *track.booking_id(),
            })
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(value["type"], "LineString");
        assert_eq!(value["coordinates"], serde_json::json!([[1.0, 1.0], [2.0, 1.0]]));
    }

    #[tokio::test]
    async fn empty_track_exports_empty_line_string() {
        let repo = Arc::new(InMemoryTripTrackRepository::new());
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        repo.save(&track).await.unwrap();

        let geojson = ExportRouteHandler::new(repo)
            .export_track_route(track.id())
            .await
            .unwrap();

        assert_eq!(geojson, EMPTY_LINE_STRING);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let err = ExportRouteHandler::new(Arc::new(InMemoryTripTrackRepository::new()))
            .handle(ExportRouteQuery {
                booking_id: BookingId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::NotFound(_)));
    }

    struct SpatialRepository;

    #[async_trait]
    impl TripTrackRepository for SpatialRepository {
        async fn find_by_id(&self, _: &TripTrackId) -> Result<Option<TripTrack>, DomainError> {
            Ok(None)
        }
        async fn find_by_booking_id(
            &self,
            _: &BookingId,
        ) -> Result<Option<TripTrack>, DomainError> {
            Ok(None)
        }
        async fn find_active_by_runner_id(
            &self,
            _: &RunnerId,
        ) -> Result<Option<TripTrack>, DomainError> {
            Ok(None)
        }
        async fn save(&self, _: &TripTrack) -> Result<(), DomainError> {
            Ok(())
        }
        async fn update(&self, _: &TripTrack, _: i64) -> Result<(), DomainError> {
            Ok(())
        }
        async fn append_waypoint(&self, _: &TripTrackId, _: &Waypoint) -> Result<(), DomainError> {
            Ok(())
        }
        async fn list_waypoints(&self, _: &TripTrackId) -> Result<Vec<Waypoint>, DomainError> {
            panic!("native geometry should have been used");
        }
        async fn route_geometry(&self, _: &TripTrackId) -> Result<Option<String>, DomainError> {
            Ok(Some(r#"{"type":"LineString","coordinates":[[5,6]]}"#.to_string()))
        }
    }

    #[tokio::test]
    async fn prefers_native_geometry() {
        let geojson = ExportRouteHandler::new(Arc::new(SpatialRepository))
            .export_track_route(&TripTrackId::new())
            .await
            .unwrap();

        assert_eq!(geojson, r#"{"type":"LineString","coordinates":[[5,6]]}"#);
    }

    /// Spatial engine that errors; everything else is in memory.
    struct MissingPostgis(InMemoryTripTrackRepository);

    #[async_trait]
    impl TripTrackRepository for MissingPostgis {
        async fn find_by_id(&self, id: &TripTrackId) -> Result<Option<TripTrack>, DomainError> {
            self.0.find_by_id(id).await
        }
        async fn find_by_booking_id(
            &self,
            booking_id: &BookingId,
        ) -> Result<Option<TripTrack>, DomainError> {
            self.0.find_by_booking_id(booking_id).await
        }
        async fn find_active_by_runner_id(
            &self,
            runner_id: &RunnerId,
        ) -> Result<Option<TripTrack>, DomainError> {
            self.0.find_active_by_runner_id(runner_id).await
        }
        async fn save(&self, track: &TripTrack) -> Result<(), DomainError> {
            self.0.save(track).await
        }
        async fn update(&self, track: &TripTrack, expected: i64) -> Result<(), DomainError> {
            self.0.update(track, expected).await
        }
        async fn append_waypoint(&self, id: &TripTrackId, wp: &Waypoint) -> Result<(), DomainError> {
            self.0.append_waypoint(id, wp).await
        }
        async fn list_waypoints(&self, id: &TripTrackId) -> Result<Vec<Waypoint>, DomainError> {
            self.0.list_waypoints(id).await
        }
        async fn route_geometry(&self, _: &TripTrackId) -> Result<Option<String>, DomainError> {
            Err(DomainError::new(
                ErrorCode::DatabaseError,
                "function st_makepoint(double precision, double precision) does not exist",
            ))
        }
    }

    #[tokio::test]
    async fn spatial_failure_falls_back_to_manual_line_string() {
        let repo = MissingPostgis(InMemoryTripTrackRepository::new());
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        repo.save(&track).await.unwrap();
        let wp = Waypoint::new(10.0, 20.0, 0.0, 0.0, Timestamp::now()).unwrap();
        repo.append_waypoint(track.id(), &wp).await.unwrap();

        let geojson = ExportRouteHandler::new(Arc::new(repo))
            .export_track_route(track.id())
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(value["coordinates"], serde_json::json!([[20.0, 10.0]]));
    }
}
