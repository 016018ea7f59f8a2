/*
 * A headless front end that hosts one form on the terminal. It feeds a
 * scripted list of events to the presenter, carries out the commands the
 * presenter queues (printing views and notifications, writing the result
 * document to disk) and synthesizes the follow-up events a browser would
 * produce: the result page load after a document replacement, and timer
 * expiry.
 */
use super::error::{PlatformError, Result as PlatformResult};
use super::result_page::scan_result_page;
use super::types::{
    AppEvent, ControlId, DownloadControlDescriptor, FormId, FormViews, PlatformCommand,
    PlatformEventHandler, ResultProbeHandle, TimerId,
};

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// Download controls found on a result page get IDs from this base upwards.
const FIRST_RESULT_CONTROL_ID: u32 = 2000;
const BACKGROUND_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct ConsolePlatform {
    form_id: FormId,
    output_path: Option<PathBuf>,
    timers: Vec<(Instant, TimerId)>,
    executed_commands: usize,
}

impl ConsolePlatform {
    pub fn new(form_id: FormId, output_path: Option<PathBuf>) -> Self {
        ConsolePlatform {
            form_id,
            output_path,
            timers: Vec::new(),
            executed_commands: 0,
        }
    }

    pub fn executed_commands(&self) -> usize {
        self.executed_commands
    }

    /*
     * Runs until the script is exhausted, no background work is outstanding
     * and no timer is pending. `on_quit` is called on the handler at the end.
     */
    pub fn run(
        &mut self,
        event_handler: Arc<Mutex<dyn PlatformEventHandler>>,
        script: Vec<AppEvent>,
    ) -> PlatformResult<()> {
        let mut pending: VecDeque<AppEvent> = script.into();
        log::debug!("Console: Running with {} scripted event(s)", pending.len());
        loop {
            if let Some(event) = pending.pop_front() {
                with_handler(&event_handler, |handler| handler.handle_event(event))?;
                pending.extend(self.drain_and_execute(&event_handler)?);
                continue;
            }

            let outstanding = with_handler(&event_handler, |handler| handler.poll_background())?;
            pending.extend(self.drain_and_execute(&event_handler)?);
            if !pending.is_empty() {
                continue;
            }
            if outstanding {
                thread::sleep(BACKGROUND_POLL_INTERVAL);
                continue;
            }

            if let Some(timer) = self.wait_for_next_timer() {
                pending.push_back(AppEvent::TimerElapsed {
                    form_id: self.form_id,
                    timer,
                });
                continue;
            }
            break;
        }
        with_handler(&event_handler, |handler| handler.on_quit())?;
        log::debug!(
            "Console: Finished after {} command(s)",
            self.executed_commands
        );
        Ok(())
    }

    fn drain_and_execute(
        &mut self,
        event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
    ) -> PlatformResult<Vec<AppEvent>> {
        let commands = with_handler(event_handler, |handler| {
            std::iter::from_fn(|| handler.try_dequeue_command()).collect::<Vec<_>>()
        })?;
        let mut follow_ups = Vec::new();
        for command in commands {
            if let Some(event) = self.execute_command(command)? {
                follow_ups.push(event);
            }
        }
        Ok(follow_ups)
    }

    fn wait_for_next_timer(&mut self) -> Option<TimerId> {
        let (position, _) = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, (deadline, _))| *deadline)?;
        let (deadline, timer) = self.timers.remove(position);
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        Some(timer)
    }

    /*
     * Carries out one command. Returns the event the host environment would
     * raise as a direct consequence, if any.
     */
    pub fn execute_command(&mut self, command: PlatformCommand) -> PlatformResult<Option<AppEvent>> {
        self.executed_commands += 1;
        match command {
            PlatformCommand::CreatePanel { control_id, .. }
            | PlatformCommand::CreateButton { control_id, .. }
            | PlatformCommand::CreateFilePicker { control_id, .. }
            | PlatformCommand::CreateDropzone { control_id, .. }
            | PlatformCommand::CreateCheckbox { control_id, .. }
            | PlatformCommand::CreateLabel { control_id, .. } => {
                log::trace!("Console: Created control {}", control_id.raw());
            }
            PlatformCommand::RenderFormViews { views, .. } => print_views(&views),
            PlatformCommand::UpdateLabelText {
                control_id, text, ..
            } => {
                log::debug!("Console: Label {} -> '{text}'", control_id.raw());
            }
            PlatformCommand::SetControlEnabled {
                control_id,
                enabled,
                ..
            } => {
                log::debug!("Console: Control {} enabled: {enabled}", control_id.raw());
            }
            PlatformCommand::SetCheckboxChecked {
                control_id,
                checked,
                ..
            } => {
                log::debug!("Console: Checkbox {} checked: {checked}", control_id.raw());
            }
            PlatformCommand::SetSubmitLoading { loading, .. } => {
                if loading {
                    println!("Converting...");
                }
            }
            PlatformCommand::SetProgressOverlay { visible, .. } => {
                log::debug!("Console: Progress overlay visible: {visible}");
            }
            PlatformCommand::ShowPreviewLoading { .. } => {
                log::debug!("Console: Preview loading placeholder shown");
            }
            PlatformCommand::SetDropzoneActive { active, .. } => {
                log::trace!("Console: Dropzone active: {active}");
            }
            PlatformCommand::SetRowDragMarkers {
                source,
                drop_candidates,
                ..
            } => {
                log::trace!("Console: Drag source {source:?}, candidates {drop_candidates:?}");
            }
            PlatformCommand::OpenFilePicker { source, .. } => {
                log::warn!("Console: No interactive file picker available for {source:?}");
            }
            PlatformCommand::ClearPickerInput { source, .. } => {
                log::trace!("Console: Cleared picker input {source:?}");
            }
            PlatformCommand::ShowNotification {
                message, severity, ..
            } => {
                println!("[{severity:?}] {message}");
            }
            PlatformCommand::ReplaceDocument { html, .. } => {
                return self.replace_document(&html).map(Some);
            }
            PlatformCommand::ApplyDownloadControl {
                control_id,
                control,
                ..
            } => {
                let state = if control.is_enabled() {
                    "available"
                } else {
                    "unavailable"
                };
                match control.href() {
                    Some(href) => println!("Download {} ({state}): {href}", control_id.raw()),
                    None => println!("Download {} ({state})", control_id.raw()),
                }
            }
            PlatformCommand::SuppressActivation { control_id, .. } => {
                log::debug!("Console: Activation of {} suppressed", control_id.raw());
            }
            PlatformCommand::ScheduleTimer {
                timer, delay_ms, ..
            } => {
                self.timers
                    .push((Instant::now() + Duration::from_millis(delay_ms), timer));
            }
        }
        Ok(None)
    }

    /*
     * Stands in for the browser replacing the page: the document is written to
     * the output path (when one is configured) and scanned, and the load is
     * reported back as `ResultPageLoaded`.
     */
    fn replace_document(&mut self, html: &str) -> PlatformResult<AppEvent> {
        match &self.output_path {
            Some(path) => {
                fs::write(path, html)?;
                println!("Result written to {}", path.display());
            }
            None => println!("Result received ({} bytes)", html.len()),
        }
        let page = scan_result_page(html)
            .map_err(|e| PlatformError::OperationFailed(format!("Result page scan: {e}")))?;
        let download_controls = page
            .controls
            .into_iter()
            .enumerate()
            .map(|(offset, scanned)| {
                let raw = u32::try_from(offset)
                    .map(|o| FIRST_RESULT_CONTROL_ID + o)
                    .map_err(|_| {
                        PlatformError::OperationFailed("Too many download controls".to_string())
                    })?;
                Ok(DownloadControlDescriptor {
                    control_id: ControlId::new(raw),
                    kind: scanned.kind,
                    control: scanned.control,
                })
            })
            .collect::<PlatformResult<Vec<_>>>()?;
        Ok(AppEvent::ResultPageLoaded {
            form_id: self.form_id,
            probe: ResultProbeHandle(Arc::new(page.probe)),
            download_controls,
            server_message: page.server_message,
        })
    }
}

fn with_handler<R>(
    event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
    f: impl FnOnce(&mut dyn PlatformEventHandler) -> R,
) -> PlatformResult<R> {
    let mut guard = event_handler
        .lock()
        .map_err(|_| PlatformError::OperationFailed("Event handler lock poisoned".to_string()))?;
    Ok(f(&mut *guard))
}

fn print_views(views: &FormViews) {
    println!("{}", views.count_label.text);
    match &views.list_placeholder {
        Some(placeholder) => println!("  {placeholder}"),
        None => views.rows.iter().for_each(|row| println!("  {}", row.label)),
    }
    match &views.template_row {
        Some(row) => println!("{}", row.label),
        None => println!("{}", views.template_name_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_layer::types::MessageSeverity;
    use tempfile::tempdir;

    const FORM: FormId = FormId(7);

    /*
     * Records events and answers the first event with a document replacement
     * and a timer, so the loop has follow-ups to synthesize.
     */
    struct ScriptedHandler {
        seen: Arc<Mutex<Vec<String>>>,
        queue: VecDeque<PlatformCommand>,
        quit_called: Arc<Mutex<bool>>,
    }

    impl PlatformEventHandler for ScriptedHandler {
        fn handle_event(&mut self, event: AppEvent) {
            let label = match &event {
                AppEvent::FormReady { .. } => {
                    self.queue.push_back(PlatformCommand::ReplaceDocument {
                        form_id: FORM,
                        html: r#"<iframe class="pdf-preview-iframe" src="/p.pdf"></iframe>
                            <a href="/d/out.docx">Download DOCX</a>"#
                            .to_string(),
                    });
                    self.queue.push_back(PlatformCommand::ScheduleTimer {
                        form_id: FORM,
                        timer: TimerId::PreviewRecheck,
                        delay_ms: 5,
                    });
                    "ready".to_string()
                }
                AppEvent::ResultPageLoaded {
                    download_controls, ..
                } => format!("loaded:{}", download_controls.len()),
                AppEvent::TimerElapsed { .. } => {
                    self.queue.push_back(PlatformCommand::ShowNotification {
                        form_id: FORM,
                        message: "rechecked".to_string(),
                        severity: MessageSeverity::Information,
                        timeout_ms: 10,
                    });
                    "timer".to_string()
                }
                other => format!("{other:?}"),
            };
            self.seen.lock().unwrap().push(label);
        }

        fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
            self.queue.pop_front()
        }

        fn on_quit(&mut self) {
            *self.quit_called.lock().unwrap() = true;
        }
    }

    #[test]
    fn test_run_writes_result_and_synthesizes_follow_up_events() {
        // Arrange
        crate::initialize_logging();
        let dir = tempdir().unwrap();
        let output = dir.path().join("result.html");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let quit_called = Arc::new(Mutex::new(false));
        let handler: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(ScriptedHandler {
            seen: Arc::clone(&seen),
            queue: VecDeque::new(),
            quit_called: Arc::clone(&quit_called),
        }));
        let mut platform = ConsolePlatform::new(FORM, Some(output.clone()));

        // Act
        let result = platform.run(handler, vec![AppEvent::FormReady { form_id: FORM }]);

        // Assert
        assert!(result.is_ok());
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["ready".to_string(), "loaded:1".to_string(), "timer".to_string()]
        );
        assert!(fs::read_to_string(&output).unwrap().contains("pdf-preview-iframe"));
        assert!(*quit_called.lock().unwrap());
        assert_eq!(platform.executed_commands(), 3);
    }

    #[test]
    fn test_download_controls_get_sequential_ids() {
        // Arrange
        let mut platform = ConsolePlatform::new(FORM, None);
        let html = r#"<a href="/a.pdf">Download PDF</a><a href="/a.docx">Download DOCX</a>"#;

        // Act
        let event = platform
            .execute_command(PlatformCommand::ReplaceDocument {
                form_id: FORM,
                html: html.to_string(),
            })
            .unwrap();

        // Assert
        match event {
            Some(AppEvent::ResultPageLoaded {
                download_controls, ..
            }) => {
                let ids: Vec<_> = download_controls.iter().map(|d| d.control_id.raw()).collect();
                assert_eq!(ids, vec![FIRST_RESULT_CONTROL_ID, FIRST_RESULT_CONTROL_ID + 1]);
            }
            other => panic!("Expected ResultPageLoaded, got {other:?}"),
        }
    }
}
