pub mod console;
pub mod error;
pub(crate) mod result_page;
pub mod types;

pub use console::ConsolePlatform;
pub use types::{
    AppEvent, ControlBinding, ControlId, DownloadControlDescriptor, DownloadKind, FormId,
    MessageSeverity, PickerSource, PlatformCommand, PlatformEventHandler, RowAction, TimerId,
};
