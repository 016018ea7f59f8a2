/*
 * Reads the conversion result page the server returns and extracts what the
 * presenter needs after the document has been replaced: the preview health,
 * the download controls and an optional server message.
 *
 * This is a tag-level scan, not a DOM. Start tags are matched with their
 * attributes (either quote style), classes are compared as whole tokens, and
 * the inline `_server_message` literal is decoded as a JSON string.
 */
use crate::core::{DownloadControl, PreviewHealth, StaticResultProbe};
use crate::platform_layer::types::DownloadKind;
use regex::Regex;
use std::collections::HashMap;

const PREVIEW_FRAME_CLASS: &str = "pdf-preview-iframe";
const PREVIEW_NOTE_CLASS: &str = "preview-note";
const ERROR_CLASS: &str = "error";
const PREVIEW_UNAVAILABLE_TEXT: &str = "pdf preview unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedControl {
    pub kind: DownloadKind,
    pub control: DownloadControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedResultPage {
    pub probe: StaticResultProbe,
    pub controls: Vec<ScannedControl>,
    pub server_message: Option<String>,
}

struct PagePatterns {
    start_tag: Regex,
    attribute: Regex,
    anchor: Regex,
    button: Regex,
    any_tag: Regex,
    server_message: Regex,
}

impl PagePatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(PagePatterns {
            start_tag: Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)\b([^>]*)>")?,
            attribute: Regex::new(
                r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
            )?,
            anchor: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>")?,
            button: Regex::new(r"(?is)<button\b([^>]*)>(.*?)</button\s*>")?,
            any_tag: Regex::new(r"<[^>]*>")?,
            server_message: Regex::new(
                r#"_server_message\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#,
            )?,
        })
    }

    // Attribute names are lower-cased; the first occurrence of a name wins.
    fn attributes(&self, raw: &str) -> HashMap<String, String> {
        let mut attributes = HashMap::new();
        for caps in self.attribute.captures_iter(raw) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            attributes
                .entry(caps[1].to_ascii_lowercase())
                .or_insert_with(|| value.to_string());
        }
        attributes
    }

    fn text_of(&self, fragment: &str) -> String {
        self.any_tag.replace_all(fragment, " ").to_ascii_lowercase()
    }
}

fn has_class(attributes: &HashMap<String, String>, class: &str) -> bool {
    attributes.get("class").is_some_and(|classes| {
        classes
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case(class))
    })
}

pub fn scan_result_page(html: &str) -> Result<ScannedResultPage, regex::Error> {
    let patterns = PagePatterns::compile()?;
    let health = preview_health(&patterns, html);
    let controls = scan_download_controls(&patterns, html);
    let docx_artifact = controls.iter().any(|c| {
        c.kind == DownloadKind::Docx && matches!(c.control, DownloadControl::Link { .. })
    });
    let page = ScannedResultPage {
        probe: StaticResultProbe {
            health,
            docx_artifact,
        },
        controls,
        server_message: server_message(&patterns, html),
    };
    log::debug!(
        "ResultPage: Preview {:?}, {} download control(s), docx artifact: {}",
        page.probe.health,
        page.controls.len(),
        page.probe.docx_artifact
    );
    Ok(page)
}

/*
 * An element carrying both `preview-note` and `error`, or a "PDF preview
 * unavailable" text anywhere, marks the preview as failed. Otherwise the
 * preview is rendered when some `<iframe>` with the preview class has a
 * non-empty `src`.
 */
fn preview_health(patterns: &PagePatterns, html: &str) -> PreviewHealth {
    let mut error_note = false;
    let mut frame_has_source = false;
    for caps in patterns.start_tag.captures_iter(html) {
        let attributes = patterns.attributes(&caps[2]);
        if has_class(&attributes, PREVIEW_NOTE_CLASS) && has_class(&attributes, ERROR_CLASS) {
            error_note = true;
        }
        if caps[1].eq_ignore_ascii_case("iframe")
            && has_class(&attributes, PREVIEW_FRAME_CLASS)
            && attributes
                .get("src")
                .is_some_and(|src| !src.trim().is_empty())
        {
            frame_has_source = true;
        }
    }
    if error_note || patterns.text_of(html).contains(PREVIEW_UNAVAILABLE_TEXT) {
        PreviewHealth::Error
    } else if frame_has_source {
        PreviewHealth::Rendered
    } else {
        PreviewHealth::Missing
    }
}

// `<a>` and `<button>` elements whose text mentions a download, in document order.
fn scan_download_controls(patterns: &PagePatterns, html: &str) -> Vec<ScannedControl> {
    let mut found = Vec::new();
    for (pattern, is_anchor) in [(&patterns.anchor, true), (&patterns.button, false)] {
        for caps in pattern.captures_iter(html) {
            let Some(kind) = download_kind(&patterns.text_of(&caps[2])) else {
                continue;
            };
            let control = if is_anchor {
                let attributes = patterns.attributes(&caps[1]);
                DownloadControl::link(attributes.get("href").cloned().unwrap_or_default())
            } else {
                DownloadControl::button()
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            found.push((start, ScannedControl { kind, control }));
        }
    }
    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, control)| control).collect()
}

fn download_kind(text: &str) -> Option<DownloadKind> {
    if !text.contains("download") {
        None
    } else if text.contains("pdf") {
        Some(DownloadKind::Pdf)
    } else if text.contains("docx") {
        Some(DownloadKind::Docx)
    } else {
        None
    }
}

// Reads `window._server_message = "..."` from an inline script, if present.
fn server_message(patterns: &PagePatterns, html: &str) -> Option<String> {
    let caps = patterns.server_message.captures(html)?;
    let body = caps.get(1).or_else(|| caps.get(2))?.as_str();
    match serde_json::from_str::<String>(&script_literal_as_json(body)) {
        Ok(message) => {
            let message = message.trim();
            (!message.is_empty()).then(|| message.to_string())
        }
        Err(e) => {
            log::warn!("ResultPage: Unreadable server message literal: {e}");
            None
        }
    }
}

/*
 * Re-quotes the body of a script string literal as a JSON string. `\'` is
 * not a JSON escape and a bare `"` only occurs in single-quoted bodies.
 */
fn script_literal_as_json(body: &str) -> String {
    let mut json = String::with_capacity(body.len() + 2);
    json.push('"');
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => json.push('\''),
                Some(next) => {
                    json.push('\\');
                    json.push(next);
                }
                None => json.push_str("\\\\"),
            },
            '"' => json.push_str("\\\""),
            _ => json.push(c),
        }
    }
    json.push('"');
    json
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEALTHY_PAGE: &str = r#"<html><body>
        <iframe class="pdf-preview-iframe" src="/preview/out.pdf"></iframe>
        <div class="result-actions">
          <a class="btn" href="/download/Out.pdf">Download PDF</a>
          <a class="btn" href="/download/Out.docx">Download DOCX</a>
          <a href="/">Start over</a>
        </div>
        <script>window._server_message = "2 images were resized";</script>
        </body></html>"#;

    fn scan(html: &str) -> ScannedResultPage {
        scan_result_page(html).unwrap()
    }

    #[test]
    fn test_healthy_page_yields_rendered_preview_and_both_links() {
        let page = scan(HEALTHY_PAGE);
        assert_eq!(page.probe.health, PreviewHealth::Rendered);
        assert!(page.probe.docx_artifact);
        assert_eq!(
            page.controls,
            vec![
                ScannedControl {
                    kind: DownloadKind::Pdf,
                    control: DownloadControl::link("/download/Out.pdf"),
                },
                ScannedControl {
                    kind: DownloadKind::Docx,
                    control: DownloadControl::link("/download/Out.docx"),
                },
            ]
        );
        assert_eq!(page.server_message.as_deref(), Some("2 images were resized"));
    }

    #[test]
    fn test_preview_error_marker_wins_over_frame() {
        let html = r#"<iframe class="pdf-preview-iframe" src="/p.pdf"></iframe>
            <p class="preview-note error">Preview failed</p>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Error);
    }

    #[test]
    fn test_preview_unavailable_text_is_an_error() {
        let html = r#"<div class="placeholder"><p>PDF Preview Unavailable</p></div>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Error);
    }

    #[test]
    fn test_frame_without_source_is_missing() {
        let html = r#"<iframe class="pdf-preview-iframe"></iframe>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Missing);
    }

    #[test]
    fn test_wrapper_class_does_not_hide_the_real_frame() {
        let html = r#"<div class="pdf-preview-iframe-wrap">
            <iframe class="viewer pdf-preview-iframe" src="/p.pdf"></iframe></div>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Rendered);
    }

    #[test]
    fn test_class_prefix_alone_is_not_a_preview_frame() {
        let html = r#"<iframe class="pdf-preview-iframe-wrap" src="/p.pdf"></iframe>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Missing);
    }

    #[test]
    fn test_single_quoted_attributes_are_read() {
        let html = r#"<IFRAME CLASS='pdf-preview-iframe' SRC='/p.pdf'></IFRAME>
            <a href='/d/Out.docx'>Download DOCX</a>"#;
        let page = scan(html);
        assert_eq!(page.probe.health, PreviewHealth::Rendered);
        assert_eq!(page.controls[0].control, DownloadControl::link("/d/Out.docx"));
        assert!(page.probe.docx_artifact);
    }

    #[test]
    fn test_data_src_does_not_count_as_source() {
        let html = r#"<iframe class="pdf-preview-iframe" data-src="/p.pdf"></iframe>"#;
        assert_eq!(scan(html).probe.health, PreviewHealth::Missing);
    }

    #[test]
    fn test_escaped_quotes_in_server_message_are_decoded() {
        let html = r#"<script>window._server_message = "Template \"house\" was invalid";</script>"#;
        assert_eq!(
            scan(html).server_message.as_deref(),
            Some(r#"Template "house" was invalid"#)
        );
    }

    #[test]
    fn test_single_quoted_server_message_is_decoded() {
        let html = r#"<script>window._server_message = 'Can\'t embed "logo.svg"';</script>"#;
        assert_eq!(
            scan(html).server_message.as_deref(),
            Some(r#"Can't embed "logo.svg""#)
        );
    }

    #[test]
    fn test_blank_server_message_is_none() {
        let html = r#"<script>window._server_message = "  ";</script>"#;
        assert_eq!(scan(html).server_message, None);
    }

    #[test]
    fn test_only_real_button_elements_are_controls() {
        let html = r#"<buttonx>Download PDF</buttonx>
            <abbr>Download DOCX</abbr>
            <button type="button">Download <span class="pdf">file</span></button>"#;
        let page = scan(html);
        assert!(page.controls.is_empty(), "Got {:?}", page.controls);
    }

    #[test]
    fn test_controls_keep_document_order_across_tags() {
        let html = r#"<button>Download PDF</button><a href="/x.docx">Download DOCX</a>"#;
        let kinds: Vec<_> = scan(html).controls.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![DownloadKind::Pdf, DownloadKind::Docx]);
    }

    #[test]
    fn test_docx_button_only_is_not_an_artifact() {
        let html = r#"<div class="result-actions"><button>Download DOCX</button></div>"#;
        let page = scan(html);
        assert!(!page.probe.docx_artifact);
        assert_eq!(page.controls.len(), 1);
        assert_eq!(page.controls[0].control, DownloadControl::button());
        assert_eq!(page.server_message, None);
    }
}
