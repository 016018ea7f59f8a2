/*
 * Derives which form controls are usable. Submit availability follows directly
 * from the section collection and the template slot. Download availability on
 * the result page follows from a health signal supplied by whoever rendered
 * that page; this module never looks at the page content itself.
 *
 * `DownloadControl` applies an availability decision to one control. Links
 * lose their destination while disabled, so the destination is stashed on
 * disable and put back verbatim on enable.
 */
use crate::core::section_collection::SectionCollection;
use crate::core::template_slot::TemplateSlot;

pub const PDF_UNAVAILABLE_TITLE: &str = "PDF not available";
pub const DOCX_UNAVAILABLE_TITLE: &str = "DOCX not available";

pub fn submit_enabled(collection: &SectionCollection, slot: &TemplateSlot) -> bool {
    !collection.is_empty() && slot.is_set()
}

// State of the rendered preview as reported by the result renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewHealth {
    Rendered,
    Missing,
    Error,
}

impl PreviewHealth {
    pub fn is_healthy(self) -> bool {
        self == PreviewHealth::Rendered
    }
}

/*
 * Health signal emitted by the conversion-result renderer. `has_docx_artifact`
 * reports whether the page offers a DOCX download at all.
 */
pub trait ConversionResultProbe: Send + Sync {
    fn preview_health(&self) -> PreviewHealth;

    fn has_docx_artifact(&self) -> bool {
        true
    }
}

// Any `Fn() -> bool` can act as a probe: true means the preview rendered.
impl<F> ConversionResultProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn preview_health(&self) -> PreviewHealth {
        if self() {
            PreviewHealth::Rendered
        } else {
            PreviewHealth::Missing
        }
    }
}

// A fixed signal, for renderers that report their state once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticResultProbe {
    pub health: PreviewHealth,
    pub docx_artifact: bool,
}

impl ConversionResultProbe for StaticResultProbe {
    fn preview_health(&self) -> PreviewHealth {
        self.health
    }

    fn has_docx_artifact(&self) -> bool {
        self.docx_artifact
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadAvailability {
    pub pdf_enabled: bool,
    pub docx_enabled: bool,
}

pub fn recompute_post_conversion(probe: &dyn ConversionResultProbe) -> DownloadAvailability {
    let health = probe.preview_health();
    let healthy = health.is_healthy();
    let availability = DownloadAvailability {
        pdf_enabled: healthy,
        docx_enabled: healthy && probe.has_docx_artifact(),
    };
    log::debug!("Enablement: Preview {health:?} -> {availability:?}");
    availability
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadControl {
    Button {
        enabled: bool,
    },
    Link {
        href: Option<String>,
        stored_href: Option<String>,
        aria_disabled: bool,
        title: String,
    },
}

impl DownloadControl {
    pub fn button() -> Self {
        DownloadControl::Button { enabled: true }
    }

    pub fn link(href: impl Into<String>) -> Self {
        DownloadControl::Link {
            href: Some(href.into()),
            stored_href: None,
            aria_disabled: false,
            title: String::new(),
        }
    }

    /*
     * Buttons are toggled in place. A link being disabled stashes its
     * destination (only if nothing is stashed yet, so repeated disables keep
     * the original) and drops navigability; enabling restores the stash.
     */
    pub fn apply_availability(&mut self, enabled: bool, unavailable_title: &str) {
        match self {
            DownloadControl::Button { enabled: current } => *current = enabled,
            DownloadControl::Link {
                href,
                stored_href,
                aria_disabled,
                title,
            } => {
                if enabled {
                    if let Some(stored) = stored_href.take() {
                        *href = Some(stored);
                    }
                    *aria_disabled = false;
                    title.clear();
                } else {
                    if stored_href.is_none() {
                        *stored_href = href.take();
                    } else {
                        *href = None;
                    }
                    *aria_disabled = true;
                    if title.is_empty() {
                        *title = unavailable_title.to_string();
                    }
                }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            DownloadControl::Button { enabled } => *enabled,
            DownloadControl::Link { aria_disabled, .. } => !*aria_disabled,
        }
    }

    // Whether activating the control may navigate or act.
    pub fn is_navigable(&self) -> bool {
        match self {
            DownloadControl::Button { enabled } => *enabled,
            DownloadControl::Link {
                href,
                aria_disabled,
                ..
            } => !*aria_disabled && href.is_some(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            DownloadControl::Link { href, .. } => href.as_deref(),
            DownloadControl::Button { .. } => None,
        }
    }
}
