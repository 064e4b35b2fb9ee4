//! Business logic services for the Farm Operations Metrics Platform

pub mod metrics;
pub mod notification;
pub mod production_report;

pub use metrics::{AggregationError, MetricsAggregator, View};
pub use notification::{MemoryNotificationSink, NotificationSink, PgNotificationSink};
pub use production_report::{NewProductionReport, ProductionReportService};
