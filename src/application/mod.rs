//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the tracking aggregate, its repository, the live broadcaster
//! and the downstream event publisher.

pub mod handlers;
pub mod inbound;
mod router;

pub use handlers::tracking::{
    CompleteTrackingCommand, CompleteTrackingHandler, CompleteTrackingOutcome,
    ExportRouteHandler, ExportRouteQuery, GetTrackingHandler, GetTrackingQuery,
    RecordLocationCommand, RecordLocationHandler, RecordLocationOutcome, StartTrackingCommand,
    StartTrackingHandler, StartTrackingOutcome, TrackingView,
};
pub use inbound::InboundEvent;
pub use router::TrackingEventRouter;
