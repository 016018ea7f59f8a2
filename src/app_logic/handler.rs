use crate::app_logic::form_view::{render_form_views, resolve_binding};
use crate::app_logic::ui_constants;
use crate::core::enablement::{self, DOCX_UNAVAILABLE_TITLE, PDF_UNAVAILABLE_TITLE};
use crate::core::ingestion::{self, IngestionReport};
use crate::core::submission::{self, SubmissionError, SubmissionPayload, SubmissionResult};
use crate::core::{
    AppConfig, ConfigManagerOperations, ConversionResultProbe, ConversionServiceOperations,
    DragReorderController, FileDescriptor, SectionCollection, SubmitGuard, TemplateSlot,
};
use crate::platform_layer::{
    AppEvent, ControlBinding, ControlId, DownloadControlDescriptor, DownloadKind, FormId,
    MessageSeverity, PickerSource, PlatformCommand, PlatformEventHandler, RowAction, TimerId,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

pub(crate) const APP_NAME: &str = "DocComposer";
pub(crate) const MISSING_INPUTS_MESSAGE: &str =
    "Please add Markdown sections and a Template (.docx).";
pub(crate) const ALREADY_CONVERTING_MESSAGE: &str = "A conversion is already in progress.";

/*
 * What the presenter knows about the result page once it has been rendered:
 * the health signal supplied by the renderer and the download controls it
 * exposes.
 */
pub(crate) struct ResultPageState {
    pub(crate) probe: Arc<dyn ConversionResultProbe>,
    pub(crate) download_controls: Vec<DownloadControlDescriptor>,
}

/*
 * Presenter for one document form. All form state lives in this struct and is
 * only touched from `handle_event`/`poll_background`, which the front end
 * calls one at a time; a page can host several independent instances.
 *
 * Every mutation of the sections or the template ends in `render_all`, which
 * bumps the render generation, regenerates all views and recomputes submit
 * availability. Per-file controls come back as `ControlBinding`s and are
 * resolved against the current generation, so a click on a control from an
 * older render is ignored instead of hitting whatever file now sits at that
 * position.
 */
pub struct FormController {
    pub(crate) form_id: FormId,
    pub(crate) collection: SectionCollection,
    pub(crate) template_slot: TemplateSlot,
    pub(crate) drag: DragReorderController,
    pub(crate) submit_guard: SubmitGuard,
    pub(crate) image_styling: bool,
    pub(crate) render_generation: u64,
    pub(crate) config: AppConfig,
    pub(crate) result_page: Option<ResultPageState>,
    pub(crate) pending_submission: Option<Receiver<SubmissionResult>>,
    synchronous_command_queue: VecDeque<PlatformCommand>,
    config_manager: Arc<dyn ConfigManagerOperations>,
    conversion_service: Arc<dyn ConversionServiceOperations>,
}

impl FormController {
    pub fn new(
        form_id: FormId,
        config_manager: Arc<dyn ConfigManagerOperations>,
        conversion_service: Arc<dyn ConversionServiceOperations>,
    ) -> Self {
        log::debug!("FormController::new called for {form_id:?}");
        FormController {
            form_id,
            collection: SectionCollection::new(),
            template_slot: TemplateSlot::new(),
            drag: DragReorderController::new(),
            submit_guard: SubmitGuard::new(),
            image_styling: false,
            render_generation: 0,
            config: AppConfig::default(),
            result_page: None,
            pending_submission: None,
            synchronous_command_queue: VecDeque::new(),
            config_manager,
            conversion_service,
        }
    }

    pub fn submit_enabled(&self) -> bool {
        enablement::submit_enabled(&self.collection, &self.template_slot)
    }

    fn enqueue(&mut self, command: PlatformCommand) {
        self.synchronous_command_queue.push_back(command);
    }

    fn notify(&mut self, message: impl Into<String>, severity: MessageSeverity, timeout_ms: u64) {
        let message = message.into();
        log::debug!("FormController: Notification ({severity:?}): {message}");
        self.enqueue(PlatformCommand::ShowNotification {
            form_id: self.form_id,
            message,
            severity,
            timeout_ms,
        });
    }

    /*
     * Loads configuration when the form becomes usable. A broken or missing
     * configuration falls back to the defaults; the form stays functional.
     */
    fn on_form_ready(&mut self) {
        match self.config_manager.load_config(APP_NAME) {
            Ok(config) => {
                log::info!("FormController: Using configuration {config:?}");
                self.config = config;
            }
            Err(e) => {
                log::warn!("FormController: Failed to load configuration: {e}. Using defaults.");
                self.config = AppConfig::default();
            }
        }
        self.image_styling = self.config.image_styling_default;
        self.enqueue(PlatformCommand::SetCheckboxChecked {
            form_id: self.form_id,
            control_id: ui_constants::IMAGE_STYLE_CHECKBOX_ID,
            checked: self.image_styling,
        });
        self.render_all();
    }

    /*
     * Regenerates every view from the current state and re-derives submit
     * availability. The generation bump invalidates all bindings handed out
     * by earlier renders.
     */
    fn render_all(&mut self) {
        self.render_generation += 1;
        let views = render_form_views(
            &self.collection,
            &self.template_slot,
            &self.drag,
            self.render_generation,
        );
        let count = views.count_label.clone();
        let template_text = views.template_name_text.clone();
        log::trace!(
            "FormController: Render generation {} with {} section(s)",
            self.render_generation,
            self.collection.len()
        );
        self.enqueue(PlatformCommand::RenderFormViews {
            form_id: self.form_id,
            views,
        });
        self.enqueue(PlatformCommand::UpdateLabelText {
            form_id: self.form_id,
            control_id: ui_constants::SECTION_COUNT_LABEL_ID,
            text: count.text,
            muted: count.muted,
        });
        self.enqueue(PlatformCommand::UpdateLabelText {
            form_id: self.form_id,
            control_id: ui_constants::TEMPLATE_NAME_LABEL_ID,
            text: template_text,
            muted: !self.template_slot.is_set(),
        });
        self.update_convert_enabled();
    }

    fn update_convert_enabled(&mut self) {
        let enabled = self.submit_enabled() && !self.submit_guard.is_in_flight();
        self.enqueue(PlatformCommand::SetControlEnabled {
            form_id: self.form_id,
            control_id: ui_constants::CONVERT_BUTTON_ID,
            enabled,
        });
    }

    fn push_drag_markers(&mut self) {
        self.enqueue(PlatformCommand::SetRowDragMarkers {
            form_id: self.form_id,
            source: self.drag.active_source(),
            drop_candidates: self.drag.drop_candidates().collect(),
        });
    }

    fn report_ingestion(&mut self, report: &IngestionReport) {
        if let Some(warning) = report.overflow_warning() {
            self.notify(
                warning,
                MessageSeverity::Warning,
                ui_constants::CAPACITY_WARNING_TIMEOUT_MS,
            );
        }
    }

    fn on_files_chosen(&mut self, source: PickerSource, files: Vec<FileDescriptor>) {
        log::debug!(
            "FormController: {} file(s) chosen via {source:?}",
            files.len()
        );
        match source {
            PickerSource::MarkdownPicker => {
                if !files.is_empty() {
                    let report = ingestion::ingest_markdown_pick(files, &mut self.collection);
                    self.report_ingestion(&report);
                    self.render_all();
                }
                self.enqueue(PlatformCommand::ClearPickerInput {
                    form_id: self.form_id,
                    source,
                });
            }
            PickerSource::TemplatePicker => {
                self.on_template_picked(files.into_iter().next());
            }
            PickerSource::Dropzone | PickerSource::OsDrop => {
                if source == PickerSource::OsDrop {
                    self.enqueue(PlatformCommand::SetDropzoneActive {
                        form_id: self.form_id,
                        active: false,
                    });
                }
                if !files.is_empty() {
                    let report = ingestion::ingest_batch(
                        files,
                        &mut self.collection,
                        &mut self.template_slot,
                    );
                    self.report_ingestion(&report);
                    self.render_all();
                }
                if source == PickerSource::Dropzone {
                    self.enqueue(PlatformCommand::ClearPickerInput {
                        form_id: self.form_id,
                        source,
                    });
                }
            }
        }
    }

    fn on_template_picked(&mut self, file: Option<FileDescriptor>) {
        ingestion::ingest_template_pick(file, &mut self.template_slot);
        self.render_all();
    }

    fn on_view_control_activated(&mut self, binding: ControlBinding) {
        let Some((action, index)) =
            resolve_binding(&binding, self.render_generation, self.collection.len())
        else {
            return;
        };
        let changed = match action {
            RowAction::Remove => self.collection.remove_at(index).is_some(),
            RowAction::MoveUp => self.collection.move_up(index),
            RowAction::MoveDown => self.collection.move_down(index),
        };
        if changed {
            self.render_all();
        }
    }

    fn on_button_clicked(&mut self, control_id: ControlId) {
        match control_id {
            ui_constants::PICK_MARKDOWN_BUTTON_ID => {
                self.enqueue(PlatformCommand::OpenFilePicker {
                    form_id: self.form_id,
                    source: PickerSource::MarkdownPicker,
                });
            }
            ui_constants::PICK_TEMPLATE_BUTTON_ID => {
                self.enqueue(PlatformCommand::OpenFilePicker {
                    form_id: self.form_id,
                    source: PickerSource::TemplatePicker,
                });
            }
            ui_constants::DROPZONE_ID => {
                self.enqueue(PlatformCommand::OpenFilePicker {
                    form_id: self.form_id,
                    source: PickerSource::Dropzone,
                });
            }
            ui_constants::RESET_SECTIONS_BUTTON_ID => {
                self.collection.clear();
                self.render_all();
            }
            ui_constants::RESET_TEMPLATE_BUTTON_ID | ui_constants::TEMPLATE_ROW_RESET_ID => {
                self.template_slot.clear();
                self.enqueue(PlatformCommand::ClearPickerInput {
                    form_id: self.form_id,
                    source: PickerSource::TemplatePicker,
                });
                self.render_all();
            }
            ui_constants::RESET_ALL_BUTTON_ID => {
                self.collection.clear();
                self.template_slot.clear();
                for source in [
                    PickerSource::MarkdownPicker,
                    PickerSource::TemplatePicker,
                    PickerSource::Dropzone,
                ] {
                    self.enqueue(PlatformCommand::ClearPickerInput {
                        form_id: self.form_id,
                        source,
                    });
                }
                self.render_all();
            }
            ui_constants::CONVERT_BUTTON_ID => self.on_submit_requested(),
            other => log::warn!("FormController: Unhandled button {other:?}"),
        }
    }

    fn on_row_drag_started(&mut self, generation: u64, index: usize) {
        if generation != self.render_generation {
            log::debug!("FormController: Drag start from stale render {generation} ignored");
            return;
        }
        if self.drag.drag_start(index, self.collection.len()) {
            self.push_drag_markers();
        }
    }

    fn on_row_drag_over(&mut self, generation: u64, index: usize) {
        if generation == self.render_generation && self.drag.drag_over(index) {
            self.push_drag_markers();
        }
    }

    fn on_row_drag_leave(&mut self, generation: u64, index: usize) {
        if generation == self.render_generation && self.drag.is_drop_candidate(index) {
            self.drag.drag_leave(index);
            self.push_drag_markers();
        }
    }

    /*
     * A drop always closes the session. A target from an older render cannot
     * be trusted as a position, so such a drop moves nothing.
     */
    fn on_row_dropped(&mut self, generation: u64, index: usize) {
        if generation != self.render_generation {
            if self.drag.is_dragging() {
                log::debug!("FormController: Drop on stale render {generation}, closing session");
                self.drag.drag_end();
                self.render_all();
            }
            return;
        }
        let outcome = self.drag.drop(index, &mut self.collection);
        log::debug!("FormController: Drop on row {index} -> {outcome:?}");
        if outcome.needs_render() {
            self.render_all();
        }
    }

    fn on_row_drag_ended(&mut self) {
        self.drag.drag_end();
        self.push_drag_markers();
    }

    /*
     * Validates the form, snapshots the section order and hands the request
     * to a worker thread. The convert control stays disabled until the
     * worker reports back; a second attempt meanwhile is refused.
     */
    fn on_submit_requested(&mut self) {
        if self.submit_guard.is_in_flight() {
            log::warn!("FormController: Submit refused, a conversion is in flight");
            self.notify(
                ALREADY_CONVERTING_MESSAGE,
                MessageSeverity::Information,
                ui_constants::DEFAULT_NOTIFICATION_TIMEOUT_MS,
            );
            return;
        }
        let payload = match SubmissionPayload::capture(
            &self.collection,
            &self.template_slot,
            self.image_styling,
        ) {
            Ok(payload) => payload,
            Err(e) => {
                log::info!("FormController: Submit blocked: {e}");
                self.notify(
                    MISSING_INPUTS_MESSAGE,
                    MessageSeverity::Warning,
                    ui_constants::DEFAULT_NOTIFICATION_TIMEOUT_MS,
                );
                return;
            }
        };
        if let Err(e) = self.submit_guard.try_begin() {
            log::error!("FormController: Submit guard rejected request: {e}");
            return;
        }

        self.enqueue(PlatformCommand::SetControlEnabled {
            form_id: self.form_id,
            control_id: ui_constants::CONVERT_BUTTON_ID,
            enabled: false,
        });
        self.enqueue(PlatformCommand::SetSubmitLoading {
            form_id: self.form_id,
            loading: true,
        });
        self.enqueue(PlatformCommand::SetProgressOverlay {
            form_id: self.form_id,
            visible: true,
        });
        self.enqueue(PlatformCommand::ShowPreviewLoading {
            form_id: self.form_id,
        });

        log::info!(
            "FormController: Submitting {} section(s) with template '{}'",
            payload.sections.len(),
            payload.template.name
        );
        match submission::spawn_submission(Arc::clone(&self.conversion_service), payload) {
            Ok(receiver) => self.pending_submission = Some(receiver),
            Err(e) => self.on_submission_completed(Err(e)),
        }
    }

    fn on_submission_completed(&mut self, result: SubmissionResult) {
        self.pending_submission = None;
        self.submit_guard.finish();
        match result {
            Ok(html) => {
                log::info!("FormController: Conversion finished, replacing document");
                self.enqueue(PlatformCommand::ReplaceDocument {
                    form_id: self.form_id,
                    html,
                });
            }
            Err(e) => {
                log::error!("FormController: Conversion failed: {e}");
                self.enqueue(PlatformCommand::SetProgressOverlay {
                    form_id: self.form_id,
                    visible: false,
                });
                self.notify(
                    format!("Upload/convert failed: {e}"),
                    MessageSeverity::Error,
                    ui_constants::DEFAULT_NOTIFICATION_TIMEOUT_MS,
                );
                self.enqueue(PlatformCommand::SetSubmitLoading {
                    form_id: self.form_id,
                    loading: false,
                });
                self.update_convert_enabled();
            }
        }
    }

    fn on_result_page_loaded(
        &mut self,
        probe: Arc<dyn ConversionResultProbe>,
        download_controls: Vec<DownloadControlDescriptor>,
        server_message: Option<String>,
    ) {
        if let Some(message) = server_message.filter(|m| !m.trim().is_empty()) {
            self.notify(
                message,
                MessageSeverity::Warning,
                ui_constants::SERVER_MESSAGE_TIMEOUT_MS,
            );
        }
        self.result_page = Some(ResultPageState {
            probe,
            download_controls,
        });
        self.apply_download_availability();
        // Previews can finish rendering after the load event; probe once more.
        self.enqueue(PlatformCommand::ScheduleTimer {
            form_id: self.form_id,
            timer: TimerId::PreviewRecheck,
            delay_ms: self.config.preview_recheck_delay_ms,
        });
    }

    fn apply_download_availability(&mut self) {
        let Some(page) = self.result_page.as_mut() else {
            log::trace!("FormController: No result page, nothing to probe");
            return;
        };
        let availability = enablement::recompute_post_conversion(page.probe.as_ref());
        let mut updates = Vec::with_capacity(page.download_controls.len());
        for descriptor in page.download_controls.iter_mut() {
            let (enabled, title) = match descriptor.kind {
                DownloadKind::Pdf => (availability.pdf_enabled, PDF_UNAVAILABLE_TITLE),
                DownloadKind::Docx => (availability.docx_enabled, DOCX_UNAVAILABLE_TITLE),
            };
            descriptor.control.apply_availability(enabled, title);
            updates.push(PlatformCommand::ApplyDownloadControl {
                form_id: self.form_id,
                control_id: descriptor.control_id,
                control: descriptor.control.clone(),
            });
        }
        self.synchronous_command_queue.extend(updates);
    }

    fn on_download_control_activated(&mut self, control_id: ControlId) {
        let navigable = self
            .result_page
            .as_ref()
            .and_then(|page| {
                page.download_controls
                    .iter()
                    .find(|d| d.control_id == control_id)
            })
            .map(|d| d.control.is_navigable());
        if navigable == Some(false) {
            log::debug!("FormController: Activation of unavailable {control_id:?} suppressed");
            self.enqueue(PlatformCommand::SuppressActivation {
                form_id: self.form_id,
                control_id,
            });
        }
    }
}

impl PlatformEventHandler for FormController {
    fn handle_event(&mut self, event: AppEvent) {
        log::trace!("FormController: Handling {event:?}");
        match event {
            AppEvent::FormReady { .. } => self.on_form_ready(),
            AppEvent::FilesChosen { source, files, .. } => self.on_files_chosen(source, files),
            AppEvent::ViewControlActivated { binding, .. } => {
                self.on_view_control_activated(binding)
            }
            AppEvent::ButtonClicked { control_id, .. } => self.on_button_clicked(control_id),
            AppEvent::CheckboxToggled {
                control_id,
                checked,
                ..
            } => {
                if control_id == ui_constants::IMAGE_STYLE_CHECKBOX_ID {
                    self.image_styling = checked;
                }
            }
            AppEvent::RowDragStarted {
                generation, index, ..
            } => self.on_row_drag_started(generation, index),
            AppEvent::RowDragOver {
                generation, index, ..
            } => self.on_row_drag_over(generation, index),
            AppEvent::RowDragLeave {
                generation, index, ..
            } => self.on_row_drag_leave(generation, index),
            AppEvent::RowDropped {
                generation, index, ..
            } => self.on_row_dropped(generation, index),
            AppEvent::RowDragEnded { .. } => self.on_row_drag_ended(),
            AppEvent::DropzoneDragOver { .. } => self.enqueue(PlatformCommand::SetDropzoneActive {
                form_id: self.form_id,
                active: true,
            }),
            AppEvent::DropzoneDragLeave { .. } => {
                self.enqueue(PlatformCommand::SetDropzoneActive {
                    form_id: self.form_id,
                    active: false,
                })
            }
            AppEvent::SubmitRequested { .. } => self.on_submit_requested(),
            AppEvent::ResultPageLoaded {
                probe,
                download_controls,
                server_message,
                ..
            } => self.on_result_page_loaded(probe.0, download_controls, server_message),
            AppEvent::DownloadControlActivated { control_id, .. } => {
                self.on_download_control_activated(control_id)
            }
            AppEvent::TimerElapsed { timer, .. } => match timer {
                TimerId::PreviewRecheck => self.apply_download_availability(),
            },
        }
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.synchronous_command_queue.pop_front()
    }

    fn poll_background(&mut self) -> bool {
        let Some(receiver) = self.pending_submission.as_ref() else {
            return false;
        };
        match receiver.try_recv() {
            Ok(result) => {
                self.on_submission_completed(result);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                self.on_submission_completed(Err(SubmissionError::WorkerDisconnected));
                false
            }
        }
    }

    fn on_quit(&mut self) {
        log::debug!(
            "FormController: Quitting with {} section(s), template set: {}",
            self.collection.len(),
            self.template_slot.is_set()
        );
    }
}

// --- Test-only accessors ---
#[cfg(test)]
impl FormController {
    pub(crate) fn test_drain_commands(&mut self) -> Vec<PlatformCommand> {
        self.synchronous_command_queue.drain(..).collect()
    }

    pub(crate) fn test_section_names(&self) -> Vec<String> {
        self.collection.iter().map(|f| f.name.clone()).collect()
    }

    pub(crate) fn test_template_name(&self) -> Option<String> {
        self.template_slot.get().map(|t| t.name.clone())
    }

    pub(crate) fn test_render_generation(&self) -> u64 {
        self.render_generation
    }

    /*
     * Blocks until the in-flight submission reports back (or the timeout
     * passes) and runs the completion handling.
     */
    pub(crate) fn test_wait_for_submission(&mut self, timeout: std::time::Duration) -> bool {
        let Some(receiver) = self.pending_submission.as_ref() else {
            return false;
        };
        match receiver.recv_timeout(timeout) {
            Ok(result) => {
                self.on_submission_completed(result);
                true
            }
            Err(_) => false,
        }
    }
}
