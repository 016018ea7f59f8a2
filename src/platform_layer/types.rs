/*
 * This module defines the vocabulary shared by the presenter and whatever
 * front end hosts the form: identifiers for forms and controls, the view
 * descriptors produced on every render, platform-agnostic events
 * (`AppEvent`), commands for the front end (`PlatformCommand`), and the
 * `PlatformEventHandler` trait the presenter implements.
 */
use crate::core::{ConversionResultProbe, DownloadControl, FileDescriptor};
use std::sync::Arc;

// Opaque identifier for one form instance. Several forms may share a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(pub usize);

/*
 * Logical identifier of a static control. The front end maps these to its
 * native elements; the presenter only ever refers to controls by this ID.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u32);

impl ControlId {
    pub const fn new(raw: u32) -> Self {
        ControlId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerSource {
    MarkdownPicker,
    TemplatePicker,
    Dropzone,
    // Files dragged in from the operating system onto the dropzone.
    OsDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Remove,
    MoveUp,
    MoveDown,
}

/*
 * Attached to every per-file control in a render. The front end hands it back
 * unchanged when the control is activated; `generation` lets the presenter
 * recognise bindings from a render that has since been replaced.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlBinding {
    pub generation: u64,
    pub action: RowAction,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    PreviewRecheck,
}

// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

// --- View descriptors ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipView {
    pub label: String,
    pub title: String,
    pub remove_aria_label: String,
    pub remove: ControlBinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub binding: ControlBinding,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRowView {
    pub rank: usize,
    pub index: usize,
    pub label: String,
    pub move_up: ButtonView,
    pub move_down: ButtonView,
    pub remove: ButtonView,
    pub draggable: bool,
    pub is_drag_source: bool,
    pub is_drop_candidate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRowView {
    pub label: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountLabel {
    pub text: String,
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormViews {
    pub generation: u64,
    pub chips: Vec<ChipView>,
    pub rows: Vec<SectionRowView>,
    pub list_placeholder: Option<String>,
    pub template_row: Option<TemplateRowView>,
    pub template_name_text: String,
    pub count_label: CountLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadKind {
    Pdf,
    Docx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadControlDescriptor {
    pub control_id: ControlId,
    pub kind: DownloadKind,
    pub control: DownloadControl,
}

/*
 * Wraps the health signal supplied with a loaded result page so events stay
 * `Debug` and cheap to clone.
 */
#[derive(Clone)]
pub struct ResultProbeHandle(pub Arc<dyn ConversionResultProbe>);

impl std::fmt::Debug for ResultProbeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResultProbeHandle({:?})", self.0.preview_health())
    }
}

// --- Events from the front end to the presenter ---

#[derive(Debug, Clone)]
pub enum AppEvent {
    // The static form description has been built and the form is usable.
    FormReady {
        form_id: FormId,
    },
    // An empty `files` from the template picker means it was cleared.
    FilesChosen {
        form_id: FormId,
        source: PickerSource,
        files: Vec<FileDescriptor>,
    },
    ViewControlActivated {
        form_id: FormId,
        binding: ControlBinding,
    },
    ButtonClicked {
        form_id: FormId,
        control_id: ControlId,
    },
    CheckboxToggled {
        form_id: FormId,
        control_id: ControlId,
        checked: bool,
    },
    RowDragStarted {
        form_id: FormId,
        generation: u64,
        index: usize,
    },
    RowDragOver {
        form_id: FormId,
        generation: u64,
        index: usize,
    },
    RowDragLeave {
        form_id: FormId,
        generation: u64,
        index: usize,
    },
    RowDropped {
        form_id: FormId,
        generation: u64,
        index: usize,
    },
    RowDragEnded {
        form_id: FormId,
    },
    DropzoneDragOver {
        form_id: FormId,
    },
    DropzoneDragLeave {
        form_id: FormId,
    },
    SubmitRequested {
        form_id: FormId,
    },
    // The replacement document has been rendered by the result renderer.
    ResultPageLoaded {
        form_id: FormId,
        probe: ResultProbeHandle,
        download_controls: Vec<DownloadControlDescriptor>,
        server_message: Option<String>,
    },
    DownloadControlActivated {
        form_id: FormId,
        control_id: ControlId,
    },
    TimerElapsed {
        form_id: FormId,
        timer: TimerId,
    },
}

// --- Commands from the presenter to the front end ---

#[derive(Debug, Clone)]
pub enum PlatformCommand {
    CreatePanel {
        form_id: FormId,
        parent_control_id: Option<ControlId>,
        control_id: ControlId,
    },
    CreateButton {
        form_id: FormId,
        parent_control_id: ControlId,
        control_id: ControlId,
        text: String,
    },
    CreateFilePicker {
        form_id: FormId,
        control_id: ControlId,
        source: PickerSource,
        accept: Vec<String>,
        multiple: bool,
    },
    CreateDropzone {
        form_id: FormId,
        parent_control_id: ControlId,
        control_id: ControlId,
        hint: String,
    },
    CreateCheckbox {
        form_id: FormId,
        parent_control_id: ControlId,
        control_id: ControlId,
        text: String,
        checked: bool,
    },
    CreateLabel {
        form_id: FormId,
        parent_control_id: ControlId,
        control_id: ControlId,
        initial_text: String,
    },
    // Replaces every generated view (chips, rows, template row) at once.
    RenderFormViews {
        form_id: FormId,
        views: FormViews,
    },
    UpdateLabelText {
        form_id: FormId,
        control_id: ControlId,
        text: String,
        muted: bool,
    },
    SetControlEnabled {
        form_id: FormId,
        control_id: ControlId,
        enabled: bool,
    },
    SetCheckboxChecked {
        form_id: FormId,
        control_id: ControlId,
        checked: bool,
    },
    SetSubmitLoading {
        form_id: FormId,
        loading: bool,
    },
    SetProgressOverlay {
        form_id: FormId,
        visible: bool,
    },
    ShowPreviewLoading {
        form_id: FormId,
    },
    SetDropzoneActive {
        form_id: FormId,
        active: bool,
    },
    // Updates drag source / drop candidate styling without a full render.
    SetRowDragMarkers {
        form_id: FormId,
        source: Option<usize>,
        drop_candidates: Vec<usize>,
    },
    OpenFilePicker {
        form_id: FormId,
        source: PickerSource,
    },
    ClearPickerInput {
        form_id: FormId,
        source: PickerSource,
    },
    ShowNotification {
        form_id: FormId,
        message: String,
        severity: MessageSeverity,
        timeout_ms: u64,
    },
    ReplaceDocument {
        form_id: FormId,
        html: String,
    },
    ApplyDownloadControl {
        form_id: FormId,
        control_id: ControlId,
        control: DownloadControl,
    },
    // Swallow the activation of a control that is currently unavailable.
    SuppressActivation {
        form_id: FormId,
        control_id: ControlId,
    },
    ScheduleTimer {
        form_id: FormId,
        timer: TimerId,
        delay_ms: u64,
    },
}

/*
 * Implemented by the presenter. The front end feeds events in through
 * `handle_event`, then drains the resulting commands with
 * `try_dequeue_command`. `poll_background` lets the presenter pick up results
 * from work running off the event thread; it returns true while such work is
 * still outstanding.
 */
pub trait PlatformEventHandler: Send + 'static {
    fn handle_event(&mut self, event: AppEvent);

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;

    fn poll_background(&mut self) -> bool {
        false
    }

    fn on_quit(&mut self) {}
}
