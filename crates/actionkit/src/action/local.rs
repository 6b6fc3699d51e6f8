// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Client-only actions: copy to clipboard and print.
//!
//! These never reach the gateway. The server writes their options as
//! declarative attributes and the client controller reads them back with
//! `from_attributes`.

use crate::protocol::{attr_flag, attr_str, attrs, Attributes};
use crate::result::NotificationStatus;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Default copy success message.
pub const DEFAULT_COPY_MESSAGE: &str = "Copied to clipboard";

/// Default copy failure message.
pub const DEFAULT_COPY_ERROR_MESSAGE: &str = "Copy failed";

/// Default copy notification duration in milliseconds.
pub const DEFAULT_COPY_DURATION_MS: u64 = 2000;

/// Which part of an element to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// Text content.
    #[default]
    Text,
    /// Inner markup.
    Html,
    /// Outer markup, including the element itself.
    Outer,
}

impl ContentKind {
    fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Html => "html",
            ContentKind::Outer => "outer",
        }
    }

    fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("html") => ContentKind::Html,
            Some("outer") => ContentKind::Outer,
            _ => ContentKind::Text,
        }
    }
}

/// Where the copied text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySource {
    /// A literal value.
    Value(String),
    /// A value resolved on the server from a record attribute.
    Attribute(String),
    /// The content of the element matching a selector.
    Element {
        /// CSS selector.
        selector: String,
        /// Text or markup.
        content: ContentKind,
    },
    /// The current text selection.
    Selection,
}

/// Output format of copied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyFormat {
    /// Copy as-is.
    #[default]
    Text,
    /// Pretty-print JSON when the source parses.
    Json,
}

/// Options of a copy action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Source of the text.
    pub source: CopySource,
    /// Output format.
    pub format: CopyFormat,
    /// Show a notification after copying.
    pub notify: bool,
    /// Success message.
    pub message: String,
    /// Failure message.
    pub error_message: String,
    /// Success severity.
    pub status: NotificationStatus,
    /// Notification duration in milliseconds.
    pub duration_ms: u64,
}

impl CopyOptions {
    /// Creates options for a source with default notifications.
    pub fn new(source: CopySource) -> Self {
        Self {
            source,
            format: CopyFormat::Text,
            notify: true,
            message: DEFAULT_COPY_MESSAGE.to_string(),
            error_message: DEFAULT_COPY_ERROR_MESSAGE.to_string(),
            status: NotificationStatus::Success,
            duration_ms: DEFAULT_COPY_DURATION_MS,
        }
    }

    /// Copies a literal value.
    pub fn value(value: impl Into<String>) -> Self {
        Self::new(CopySource::Value(value.into()))
    }

    /// Copies a value resolved from a record attribute.
    pub fn attribute(resolved: impl Into<String>) -> Self {
        Self::new(CopySource::Attribute(resolved.into()))
    }

    /// Copies the text content of an element.
    pub fn element(selector: impl Into<String>) -> Self {
        Self::new(CopySource::Element {
            selector: selector.into(),
            content: ContentKind::Text,
        })
    }

    /// Copies the current selection.
    pub fn selection() -> Self {
        Self::new(CopySource::Selection)
    }

    /// Reads markup instead of text for element sources.
    pub fn html(mut self) -> Self {
        if let CopySource::Element { content, .. } = &mut self.source {
            *content = ContentKind::Html;
        }
        self
    }

    /// Sets the output format.
    pub fn copy_as(mut self, format: CopyFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables or disables the notification.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Sets the success message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the failure message.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Sets the success severity.
    pub fn status(mut self, status: NotificationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the notification duration.
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Writes the options as attributes.
    pub fn write_attributes(&self, out: &mut Attributes) {
        let (mode, value) = match &self.source {
            CopySource::Value(v) => ("value", Some(v.as_str())),
            CopySource::Attribute(v) => ("attribute", Some(v.as_str())),
            CopySource::Element { selector, content } => {
                out.insert(attrs::COPY_SELECTOR.into(), selector.clone());
                out.insert(attrs::COPY_CONTENT.into(), content.as_str().into());
                ("element", None)
            }
            CopySource::Selection => ("selection", None),
        };
        out.insert(attrs::CLIENT_ACTION.into(), "copy".into());
        out.insert(attrs::COPY_MODE.into(), mode.into());
        if let Some(value) = value {
            out.insert(attrs::COPY_VALUE.into(), value.into());
        }
        if self.format == CopyFormat::Json {
            out.insert(attrs::COPY_AS.into(), "json".into());
        }
        out.insert(attrs::COPY_NOTIFY.into(), self.notify.to_string());
        out.insert(attrs::COPY_MESSAGE.into(), self.message.clone());
        out.insert(attrs::COPY_ERROR_MESSAGE.into(), self.error_message.clone());
        out.insert(attrs::COPY_STATUS.into(), self.status.as_str().into());
        out.insert(attrs::COPY_DURATION.into(), self.duration_ms.to_string());
    }

    /// Reads options from attributes.
    ///
    /// Returns `None` when the mode is unknown or its required attribute is
    /// missing.
    pub fn from_attributes(attributes: &Attributes) -> Option<Self> {
        let mode = attr_str(attributes, attrs::COPY_MODE).unwrap_or("value");
        let source = match mode {
            "value" => CopySource::Value(attributes.get(attrs::COPY_VALUE)?.clone()),
            "attribute" => CopySource::Attribute(attributes.get(attrs::COPY_VALUE)?.clone()),
            "element" => CopySource::Element {
                selector: attr_str(attributes, attrs::COPY_SELECTOR)?.to_string(),
                content: ContentKind::parse(attr_str(attributes, attrs::COPY_CONTENT)),
            },
            "selection" => CopySource::Selection,
            _ => return None,
        };

        let mut options = Self::new(source);
        if attr_str(attributes, attrs::COPY_AS).map(|s| s.eq_ignore_ascii_case("json")) == Some(true) {
            options.format = CopyFormat::Json;
        }
        if attributes.contains_key(attrs::COPY_NOTIFY) {
            options.notify = attr_flag(attributes, attrs::COPY_NOTIFY);
        }
        if let Some(message) = attr_str(attributes, attrs::COPY_MESSAGE) {
            options.message = message.to_string();
        }
        if let Some(message) = attr_str(attributes, attrs::COPY_ERROR_MESSAGE) {
            options.error_message = message.to_string();
        }
        if let Some(status) = attr_str(attributes, attrs::COPY_STATUS) {
            options.status = NotificationStatus::parse_lossy(status);
        }
        if let Some(duration) = attr_str(attributes, attrs::COPY_DURATION).and_then(|d| d.trim().parse().ok()) {
            options.duration_ms = duration;
        }
        Some(options)
    }
}

/// What a print action prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintTarget {
    /// The current page.
    Page,
    /// The element matching a selector.
    Element(String),
    /// Arbitrary markup.
    Html(String),
    /// A remote URL.
    Url(String),
}

/// Options of a print action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// What to print.
    pub target: PrintTarget,
    /// Title of the print document.
    pub title: Option<String>,
    /// CSS injected while printing.
    pub css: Option<String>,
    /// Delay before the print dialog opens.
    pub delay_ms: u64,
}

impl PrintOptions {
    /// Creates options for a target.
    pub fn new(target: PrintTarget) -> Self {
        Self {
            target,
            title: None,
            css: None,
            delay_ms: 0,
        }
    }

    /// Prints the current page.
    pub fn page() -> Self {
        Self::new(PrintTarget::Page)
    }

    /// Prints an element.
    pub fn element(selector: impl Into<String>) -> Self {
        Self::new(PrintTarget::Element(selector.into()))
    }

    /// Prints markup.
    pub fn html(markup: impl Into<String>) -> Self {
        Self::new(PrintTarget::Html(markup.into()))
    }

    /// Prints a URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self::new(PrintTarget::Url(url.into()))
    }

    /// Sets the document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the injected CSS.
    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Sets the delay before printing.
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Writes the options as attributes.
    ///
    /// Markup is base64-encoded so it survives attribute quoting.
    pub fn write_attributes(&self, out: &mut Attributes) {
        let mode = match &self.target {
            PrintTarget::Page => "page",
            PrintTarget::Element(selector) => {
                out.insert(attrs::PRINT_SELECTOR.into(), selector.clone());
                "element"
            }
            PrintTarget::Html(markup) => {
                out.insert(attrs::PRINT_HTML.into(), STANDARD.encode(markup));
                "html"
            }
            PrintTarget::Url(url) => {
                out.insert(attrs::PRINT_URL.into(), url.clone());
                "url"
            }
        };
        out.insert(attrs::CLIENT_ACTION.into(), "print".into());
        out.insert(attrs::PRINT_MODE.into(), mode.into());
        if let Some(title) = &self.title {
            out.insert(attrs::PRINT_TITLE.into(), title.clone());
        }
        if let Some(css) = &self.css {
            out.insert(attrs::PRINT_CSS.into(), css.clone());
        }
        if self.delay_ms > 0 {
            out.insert(attrs::PRINT_DELAY.into(), self.delay_ms.to_string());
        }
    }

    /// Reads options from attributes.
    ///
    /// Returns `None` when the mode is unknown, its required attribute is
    /// missing or the markup is not valid base64 UTF-8.
    pub fn from_attributes(attributes: &Attributes) -> Option<Self> {
        let target = match attr_str(attributes, attrs::PRINT_MODE).unwrap_or("page") {
            "page" => PrintTarget::Page,
            "element" => PrintTarget::Element(attr_str(attributes, attrs::PRINT_SELECTOR)?.to_string()),
            "html" => {
                let encoded = attr_str(attributes, attrs::PRINT_HTML)?;
                let bytes = STANDARD.decode(encoded.trim()).ok()?;
                PrintTarget::Html(String::from_utf8(bytes).ok()?)
            }
            "url" => PrintTarget::Url(attr_str(attributes, attrs::PRINT_URL)?.to_string()),
            _ => return None,
        };

        Some(Self {
            target,
            title: attr_str(attributes, attrs::PRINT_TITLE).map(str::to_string),
            css: attr_str(attributes, attrs::PRINT_CSS).map(str::to_string),
            delay_ms: attr_str(attributes, attrs::PRINT_DELAY)
                .and_then(|d| d.trim().parse().ok())
                .unwrap_or(0),
        })
    }
}
