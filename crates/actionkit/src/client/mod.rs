// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Headless client controller.
//!
//! [`ActionController`] implements the client half of the protocol against
//! the [`Host`] seams: it reads an element's declarative attributes, asks for
//! confirmation or opens the schema modal, sends the execution request and
//! reconciles the result with the page.

mod config;
mod controller;
mod copy;
mod error;
mod host;
mod loopback;
mod modal;
mod print;
mod reconcile;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ActionConfig, ModalConfig, ModalText, DEFAULT_CONFIRM_DESCRIPTION};
pub use controller::{
    append_query, ActionController, ActivationOutcome, CompleteCallback, ErrorCallback,
    ExecuteOptions, RejectReason, SuccessCallback, TriggerTarget, DEFAULT_MODAL_EXIT_DELAY,
    MISSING_CONFIGURATION,
};
pub use copy::{format_copy_text, resolve_copy_text};
pub use error::{ClientError, TransportError};
pub use host::{
    events, ClientEvent, Clipboard, ConfirmRequest, ConfirmService, Document, ElementRef,
    FrameSource, Host, HttpRequest, HttpResponse, ModalSurface, NavigateOptions, Notifier,
    PrintHost, Timer, TokioTimer, Transport,
};
pub use loopback::LoopbackTransport;
pub use modal::{render_modal, CLOSE_ATTR, SUBMIT_ATTR};
pub use print::{frame_source, AFTER_PRINT_TIMEOUT, FRAME_LOAD_TIMEOUT};
pub use reconcile::{GENERIC_ERROR_BODY, GENERIC_ERROR_TITLE};
