//! PostgreSQL implementation of TripTrackRepository.
//!
//! Tracks live in `trip_tracks`, waypoints in the append-only `waypoints`
//! table. Route geometry is built by PostGIS when the extension is present.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, RunnerId, Timestamp, TripTrackId, WaypointId,
};
use crate::domain::tracking::{TrackingStatus, TripTrack, Waypoint};
use crate::ports::TripTrackRepository;

const BOOKING_UNIQUE_CONSTRAINT: &str = "trip_tracks_booking_id_key";
const ACTIVE_RUNNER_INDEX: &str = "trip_tracks_one_active_per_runner";

/// PostgreSQL implementation of the TripTrackRepository port.
#[derive(Clone)]
pub struct PostgresTripTrackRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresTripTrackRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTripTrackRepository")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresTripTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_track(
        &self,
        sql: &str,
        key: Uuid,
        context: &str,
    ) -> Result<Option<TripTrack>, DomainError> {
        let row = sqlx::query_as::<_, TripTrackRow>(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(context, e))?;

        row.map(TripTrackRow::into_track).transpose()
    }
}

/// Internal row type for sqlx query mapping.
#[derive(Debug, sqlx::FromRow)]
struct TripTrackRow {
    id: Uuid,
    booking_id: Uuid,
    runner_id: Uuid,
    status: String,
    total_distance_km: f64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TripTrackRow {
    fn into_track(self) -> Result<TripTrack, DomainError> {
        let status: TrackingStatus = self.status.parse().map_err(|e| {
            DomainError::new(ErrorCode::InvalidFormat, format!("Invalid status in row: {}", e))
        })?;

        Ok(TripTrack::reconstitute(
            TripTrackId::from_uuid(self.id),
            BookingId::from_uuid(self.booking_id),
            RunnerId::from_uuid(self.runner_id),
            status,
            self.total_distance_km,
            Timestamp::from_datetime(self.started_at),
            self.completed_at.map(Timestamp::from_datetime),
            self.version,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WaypointRow {
    id: Uuid,
    latitude: f64,
    longitude: f64,
    speed: f64,
    heading: f64,
    recorded_at: DateTime<Utc>,
}

impl From<WaypointRow> for Waypoint {
    fn from(row: WaypointRow) -> Self {
        Waypoint::reconstitute(
            WaypointId::from_uuid(row.id),
            row.latitude,
            row.longitude,
            row.speed,
            row.heading,
            Timestamp::from_datetime(row.recorded_at),
        )
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_TRACK: &str = r#"
    SELECT id, booking_id, runner_id, status, total_distance_km,
           started_at, completed_at, version, created_at, updated_at
    FROM trip_tracks
"#;

#[async_trait]
impl TripTrackRepository for PostgresTripTrackRepository {
    async fn find_by_id(&self, id: &TripTrackId) -> Result<Option<TripTrack>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_TRACK);
        self.fetch_track(&sql, *id.as_uuid(), "Failed to find trip track")
            .await
    }

    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<TripTrack>, DomainError> {
        let sql = format!("{} WHERE booking_id = $1", SELECT_TRACK);
        self.fetch_track(&sql, *booking_id.as_uuid(), "Failed to find trip track by booking")
            .await
    }

    async fn find_active_by_runner_id(
        &self,
        runner_id: &RunnerId,
    ) -> Result<Option<TripTrack>, DomainError> {
        let sql = format!(
            "{} WHERE runner_id = $1 AND status = 'active' ORDER BY started_at DESC LIMIT 1",
            SELECT_TRACK
        );
        self.fetch_track(&sql, *runner_id.as_uuid(), "Failed to find active trip track")
            .await
    }

    async fn save(&self, track: &TripTrack) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO trip_tracks (
                id, booking_id, runner_id, status, total_distance_km,
                started_at, completed_at, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(track.id().as_uuid())
        .bind(track.booking_id().as_uuid())
        .bind(track.runner_id().as_uuid())
        .bind(track.status().as_str())
        .bind(track.total_distance_km())
        .bind(track.started_at().as_datetime())
        .bind(track.completed_at().map(|t| *t.as_datetime()))
        .bind(track.version())
        .bind(track.created_at().as_datetime())
        .bind(track.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.constraint() {
                    Some(BOOKING_UNIQUE_CONSTRAINT) => {
                        return DomainError::new(
                            ErrorCode::DuplicateTripTrack,
                            format!("booking {}", track.booking_id()),
                        );
                    }
                    Some(ACTIVE_RUNNER_INDEX) => {
                        return DomainError::new(
                            ErrorCode::RunnerAlreadyTracking,
                            track.runner_id().to_string(),
                        );
                    }
                    _ => {}
                }
            }
            db_error("Failed to save trip track", e)
        })?;

        Ok(())
    }

    async fn update(&self, track: &TripTrack, expected_version: i64) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE trip_tracks SET
                status = $1,
                total_distance_km = $2,
                completed_at = $3,
                version = $4,
                updated_at = $5
            WHERE id = $6 AND version = $7
            "#,
        )
        .bind(track.status().as_str())
        .bind(track.total_distance_km())
        .bind(track.completed_at().map(|t| *t.as_datetime()))
        .bind(track.version())
        .bind(track.updated_at().as_datetime())
        .bind(track.id().as_uuid())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update trip track", e))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM trip_tracks WHERE id = $1)",
            )
            .bind(track.id().as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to check trip track", e))?;

            return Err(if exists {
                DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!(
                        "trip track {} is no longer at version {}",
                        track.id(),
                        expected_version
                    ),
                )
                .with_detail("expected_version", expected_version.to_string())
            } else {
                DomainError::new(
                    ErrorCode::TripTrackNotFound,
                    format!("trip track {}", track.id()),
                )
            });
        }

        Ok(())
    }

    async fn append_waypoint(
        &self,
        track_id: &TripTrackId,
        waypoint: &Waypoint,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO waypoints (
                id, trip_track_id, latitude, longitude, speed, heading, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(waypoint.id().as_uuid())
        .bind(track_id.as_uuid())
        .bind(waypoint.latitude())
        .bind(waypoint.longitude())
        .bind(waypoint.speed_kmh())
        .bind(waypoint.heading_degrees())
        .bind(waypoint.recorded_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append waypoint", e))?;

        Ok(())
    }

    async fn list_waypoints(&self, track_id: &TripTrackId) -> Result<Vec<Waypoint>, DomainError> {
        let rows = sqlx::query_as::<_, WaypointRow>(
            r#"
            SELECT id, latitude, longitude, speed, heading, recorded_at
            FROM waypoints
            WHERE trip_track_id = $1
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(track_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list waypoints", e))?;

        Ok(rows.into_iter().map(Waypoint::from).collect())
    }

    async fn route_geometry(&self, track_id: &TripTrackId) -> Result<Option<String>, DomainError> {
        let result = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT ST_AsGeoJSON(
                ST_MakeLine(ST_MakePoint(w.longitude, w.latitude) ORDER BY w.recorded_at)
            )::text
            FROM waypoints w
            WHERE w.trip_track_id = $1
            "#,
        )
        .bind(track_id.as_uuid())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(geometry) => Ok(geometry.filter(|g| !g.is_empty())),
            Err(e) => {
                tracing::warn!(track_id = %track_id, error = %e, "Spatial route query unavailable");
                Ok(None)
            }
        }
    }
}
