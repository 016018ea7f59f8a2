/*
 * This module consolidates the platform-agnostic rules of the document form:
 * file identity, the ordered section collection, the template slot, drag
 * reordering, control enablement, ingestion of raw file batches, submission
 * of the ordered payload, and application configuration. Nothing in here
 * knows about controls or events; the presenter in `app_logic` drives it.
 */
pub mod config;
pub mod drag_reorder;
pub mod enablement;
pub mod file_descriptor;
pub mod ingestion;
pub mod section_collection;
pub mod submission;
pub mod template_slot;

pub use config::{AppConfig, ConfigManagerOperations, CoreConfigManager};
pub use drag_reorder::DragReorderController;
pub use enablement::{ConversionResultProbe, DownloadControl, PreviewHealth, StaticResultProbe};
pub use file_descriptor::FileDescriptor;
pub use section_collection::{MAX_SECTION_FILES, SectionCollection};
pub use submission::{ConversionServiceOperations, CoreConversionService, SubmitGuard};
pub use template_slot::TemplateSlot;
