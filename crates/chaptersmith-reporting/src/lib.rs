//! Report export and narration-ready output for a processing run.

pub mod credits;
pub mod export;
pub mod narration;

pub use credits::{BookMetadata, CreditsGenerator};
pub use export::{ExportFormat, RunReport, export_report, render_report};
pub use narration::{chapter_filename, sanitize_title, write_chapter_files};
