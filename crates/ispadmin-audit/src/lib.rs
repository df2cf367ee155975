//! ISP Admin Audit: filtered, paginated reads of the audit trail and
//! spreadsheet export of the matching set.

pub mod config;
pub mod engine;
pub mod export;
pub mod notice;

pub use config::AuditConfig;
pub use engine::{AuditQueryEngine, FetchOutcome};
pub use export::{AuditExporter, DirectorySink, ExportedFile, FileSink};
pub use notice::{Notice, NoticeBoard, NoticeKind};
