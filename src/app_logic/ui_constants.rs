/*
 * Logical control identifiers for the static parts of the form. The
 * `ui_description_layer` uses them to describe the form and the presenter uses
 * them to target controls for updates. Per-file controls have no fixed ID;
 * they are addressed through `ControlBinding`s instead.
 */
use crate::platform_layer::types::ControlId;

pub const FORM_PANEL_ID: ControlId = ControlId::new(1000);

// --- Pickers and dropzone ---
pub const PICK_MARKDOWN_BUTTON_ID: ControlId = ControlId::new(1001);
pub const PICK_TEMPLATE_BUTTON_ID: ControlId = ControlId::new(1002);
pub const MARKDOWN_INPUT_ID: ControlId = ControlId::new(1003);
pub const TEMPLATE_INPUT_ID: ControlId = ControlId::new(1004);
pub const COMBO_INPUT_ID: ControlId = ControlId::new(1005);
pub const DROPZONE_ID: ControlId = ControlId::new(1006);

// --- Resets ---
pub const RESET_SECTIONS_BUTTON_ID: ControlId = ControlId::new(1010);
pub const RESET_TEMPLATE_BUTTON_ID: ControlId = ControlId::new(1011);
pub const RESET_ALL_BUTTON_ID: ControlId = ControlId::new(1012);
// The reset control shown inside the generated template row.
pub const TEMPLATE_ROW_RESET_ID: ControlId = ControlId::new(1013);

pub const IMAGE_STYLE_CHECKBOX_ID: ControlId = ControlId::new(1020);
pub const CONVERT_BUTTON_ID: ControlId = ControlId::new(1030);

// --- Labels ---
pub const SECTION_COUNT_LABEL_ID: ControlId = ControlId::new(1040);
pub const TEMPLATE_NAME_LABEL_ID: ControlId = ControlId::new(1041);

pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 6000;
pub const CAPACITY_WARNING_TIMEOUT_MS: u64 = 7000;
pub const SERVER_MESSAGE_TIMEOUT_MS: u64 = 8000;

pub const MARKDOWN_ACCEPT: [&str; 3] = [".md", ".markdown", ".mdx"];
pub const TEMPLATE_ACCEPT: [&str; 1] = [".docx"];
