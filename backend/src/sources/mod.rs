//! Data sources and fallback resolution

pub mod adapter;
pub mod memory;
pub mod registry;
pub mod resolver;
pub mod table;

pub use adapter::{RecordSink, SourceAdapter, SourceError, TableSpec};
pub use memory::MemorySource;
pub use registry::{MemoryTables, SourceRegistry, REPORT_TABLE};
pub use resolver::{Candidate, FallbackResolver, Resolved};
pub use table::TableSource;
