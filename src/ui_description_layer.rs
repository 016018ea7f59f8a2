/*
 * This module is responsible for defining the static structure of the form.
 * It generates a series of `PlatformCommand`s that describe the pickers,
 * dropzone, reset and convert buttons, the image-styling option and the
 * labels the presenter keeps up to date. The per-file views are not part of
 * this description; the presenter renders those on every state change.
 */
use crate::app_logic::form_view::{NO_SECTIONS_TEXT, NO_TEMPLATE_TEXT};
use crate::app_logic::ui_constants;
use crate::core::MAX_SECTION_FILES;
use crate::platform_layer::types::{FormId, PickerSource, PlatformCommand};

fn accept_list(extensions: &[&str]) -> Vec<String> {
    extensions.iter().map(|e| e.to_string()).collect()
}

/*
 * Generates the commands that construct one form. Intended to be called once
 * per form, before `FormReady` is delivered to that form's presenter.
 */
pub fn build_form_static_layout(form_id: FormId) -> Vec<PlatformCommand> {
    log::debug!("ui_description_layer: build_form_static_layout called for {form_id:?}.");

    let panel = ui_constants::FORM_PANEL_ID;
    let mut commands = vec![PlatformCommand::CreatePanel {
        form_id,
        parent_control_id: None,
        control_id: panel,
    }];

    // 1. Hidden inputs behind the pickers and the dropzone
    let combo_accept: Vec<String> = ui_constants::MARKDOWN_ACCEPT
        .iter()
        .chain(ui_constants::TEMPLATE_ACCEPT.iter())
        .map(|e| e.to_string())
        .collect();
    commands.push(PlatformCommand::CreateFilePicker {
        form_id,
        control_id: ui_constants::MARKDOWN_INPUT_ID,
        source: PickerSource::MarkdownPicker,
        accept: accept_list(&ui_constants::MARKDOWN_ACCEPT),
        multiple: true,
    });
    commands.push(PlatformCommand::CreateFilePicker {
        form_id,
        control_id: ui_constants::TEMPLATE_INPUT_ID,
        source: PickerSource::TemplatePicker,
        accept: accept_list(&ui_constants::TEMPLATE_ACCEPT),
        multiple: false,
    });
    commands.push(PlatformCommand::CreateFilePicker {
        form_id,
        control_id: ui_constants::COMBO_INPUT_ID,
        source: PickerSource::Dropzone,
        accept: combo_accept,
        multiple: true,
    });

    // 2. Visible controls
    commands.push(PlatformCommand::CreateDropzone {
        form_id,
        parent_control_id: panel,
        control_id: ui_constants::DROPZONE_ID,
        hint: format!(
            "Drop up to {MAX_SECTION_FILES} Markdown files and one .docx template, or click to browse"
        ),
    });
    for (control_id, text) in [
        (ui_constants::PICK_MARKDOWN_BUTTON_ID, "Choose Markdown"),
        (ui_constants::PICK_TEMPLATE_BUTTON_ID, "Choose Template"),
        (ui_constants::RESET_SECTIONS_BUTTON_ID, "Clear Sections"),
        (ui_constants::RESET_TEMPLATE_BUTTON_ID, "Clear Template"),
        (ui_constants::RESET_ALL_BUTTON_ID, "Reset"),
    ] {
        commands.push(PlatformCommand::CreateButton {
            form_id,
            parent_control_id: panel,
            control_id,
            text: text.to_string(),
        });
    }
    commands.push(PlatformCommand::CreateCheckbox {
        form_id,
        parent_control_id: panel,
        control_id: ui_constants::IMAGE_STYLE_CHECKBOX_ID,
        text: "Style images".to_string(),
        checked: false,
    });

    // 3. Labels the presenter updates on every render
    commands.push(PlatformCommand::CreateLabel {
        form_id,
        parent_control_id: panel,
        control_id: ui_constants::SECTION_COUNT_LABEL_ID,
        initial_text: NO_SECTIONS_TEXT.to_string(),
    });
    commands.push(PlatformCommand::CreateLabel {
        form_id,
        parent_control_id: panel,
        control_id: ui_constants::TEMPLATE_NAME_LABEL_ID,
        initial_text: NO_TEMPLATE_TEXT.to_string(),
    });

    // 4. Convert starts disabled until sections and a template are present
    commands.push(PlatformCommand::CreateButton {
        form_id,
        parent_control_id: panel,
        control_id: ui_constants::CONVERT_BUTTON_ID,
        text: "Convert".to_string(),
    });
    commands.push(PlatformCommand::SetControlEnabled {
        form_id,
        control_id: ui_constants::CONVERT_BUTTON_ID,
        enabled: false,
    });

    commands
}
