/*
 * Assembles and sends the conversion request. The order of sections is fixed
 * when `SubmissionPayload::capture` runs, before any file is read, and the
 * multipart fields are emitted in exactly that order regardless of how long
 * individual reads take.
 *
 * Only one request may be in flight per form; `SubmitGuard` refuses a second
 * attempt instead of queueing it. The request itself runs on a worker thread
 * and its result travels back to the presenter over a channel.
 */
use crate::core::config::AppConfig;
use crate::core::file_descriptor::FileDescriptor;
use crate::core::section_collection::SectionCollection;
use crate::core::template_slot::TemplateSlot;
use reqwest::blocking::{Client, multipart};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

pub const CONVERT_ENDPOINT_PATH: &str = "/convert";
pub const SECTION_FIELD: &str = "raw_files";
pub const TEMPLATE_FIELD: &str = "template_file";
pub const IMAGE_STYLE_FIELD: &str = "img_style";

#[derive(Debug)]
pub enum SubmissionError {
    PreconditionNotMet { has_sections: bool, has_template: bool },
    AlreadyInFlight,
    Io(io::Error),
    Http(reqwest::Error),
    Status(u16),
    WorkerDisconnected,
}

impl From<io::Error> for SubmissionError {
    fn from(err: io::Error) -> Self {
        SubmissionError::Io(err)
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        SubmissionError::Http(err)
    }
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::PreconditionNotMet {
                has_sections,
                has_template,
            } => write!(
                f,
                "Submission needs sections and a template (sections: {has_sections}, template: {has_template})"
            ),
            SubmissionError::AlreadyInFlight => write!(f, "A conversion is already in progress"),
            SubmissionError::Io(e) => write!(f, "Could not read file: {e}"),
            SubmissionError::Http(e) => write!(f, "Request failed: {e}"),
            SubmissionError::Status(code) => write!(f, "Server responded with status {code}"),
            SubmissionError::WorkerDisconnected => {
                write!(f, "Submission worker stopped without a result")
            }
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::Io(e) => Some(e),
            SubmissionError::Http(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SubmissionError>;

// Outcome delivered by the worker: the replacement document, or the failure.
pub type SubmissionResult = Result<String>;

#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub sections: Vec<FileDescriptor>,
    pub template: FileDescriptor,
    pub image_styling: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    File { file_name: String, bytes: Vec<u8> },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: &'static str,
    pub value: FieldValue,
}

impl SubmissionPayload {
    /*
     * Snapshots the current section order and template. Fails with
     * `PreconditionNotMet` when either is missing, before anything is read.
     */
    pub fn capture(
        collection: &SectionCollection,
        slot: &TemplateSlot,
        image_styling: bool,
    ) -> Result<Self> {
        match slot.get() {
            Some(template) if !collection.is_empty() => Ok(SubmissionPayload {
                sections: collection.files().to_vec(),
                template: template.clone(),
                image_styling,
            }),
            _ => Err(SubmissionError::PreconditionNotMet {
                has_sections: !collection.is_empty(),
                has_template: slot.is_set(),
            }),
        }
    }

    /*
     * Reads every file and lays the fields out as sent: one `raw_files` part
     * per section in captured order, the `template_file` part, then
     * `img_style` only when image styling is on.
     */
    pub fn read_fields(&self) -> Result<Vec<MultipartField>> {
        let mut fields = Vec::with_capacity(self.sections.len() + 2);
        for section in &self.sections {
            fields.push(MultipartField {
                name: SECTION_FIELD,
                value: FieldValue::File {
                    file_name: section.name.clone(),
                    bytes: section.content.read_bytes()?,
                },
            });
        }
        fields.push(MultipartField {
            name: TEMPLATE_FIELD,
            value: FieldValue::File {
                file_name: self.template.name.clone(),
                bytes: self.template.content.read_bytes()?,
            },
        });
        if self.image_styling {
            fields.push(MultipartField {
                name: IMAGE_STYLE_FIELD,
                value: FieldValue::Text("1".to_string()),
            });
        }
        Ok(fields)
    }
}

#[derive(Debug, Default)]
pub struct SubmitGuard {
    in_flight: bool,
}

impl SubmitGuard {
    pub fn new() -> Self {
        SubmitGuard { in_flight: false }
    }

    pub fn try_begin(&mut self) -> Result<()> {
        if self.in_flight {
            log::warn!("SubmitGuard: Refusing second submission while one is pending");
            return Err(SubmissionError::AlreadyInFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

pub trait ConversionServiceOperations: Send + Sync {
    // Sends the payload and returns the replacement document body.
    fn convert(&self, payload: &SubmissionPayload) -> SubmissionResult;
}

pub struct CoreConversionService {
    client: Client,
    endpoint_url: String,
}

impl CoreConversionService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(CoreConversionService {
            client,
            endpoint_url: endpoint_url(&config.server_base_url),
        })
    }
}

pub fn endpoint_url(server_base_url: &str) -> String {
    format!(
        "{}{CONVERT_ENDPOINT_PATH}",
        server_base_url.trim_end_matches('/')
    )
}

impl ConversionServiceOperations for CoreConversionService {
    fn convert(&self, payload: &SubmissionPayload) -> SubmissionResult {
        let fields = payload.read_fields()?;
        let mut form = multipart::Form::new();
        for field in fields {
            form = match field.value {
                FieldValue::File { file_name, bytes } => {
                    form.part(field.name, multipart::Part::bytes(bytes).file_name(file_name))
                }
                FieldValue::Text(text) => form.text(field.name, text),
            };
        }

        log::info!(
            "CoreConversionService: POST {} with {} section(s)",
            self.endpoint_url,
            payload.sections.len()
        );
        let response = self.client.post(&self.endpoint_url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            log::error!("CoreConversionService: Server answered {status}");
            return Err(SubmissionError::Status(status.as_u16()));
        }
        let body = response.text()?;
        log::debug!("CoreConversionService: Received {} byte document", body.len());
        Ok(body)
    }
}

/*
 * Runs `service.convert(payload)` on a background thread. The receiver yields
 * exactly one `SubmissionResult`.
 */
pub fn spawn_submission(
    service: Arc<dyn ConversionServiceOperations>,
    payload: SubmissionPayload,
) -> Result<Receiver<SubmissionResult>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("submission".to_string())
        .spawn(move || {
            let result = service.convert(&payload);
            if sender.send(result).is_err() {
                log::warn!("Submission: Presenter went away before the result arrived");
            }
        })?;
    Ok(receiver)
}
