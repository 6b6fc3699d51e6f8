// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Prebuilt bulk actions.

use super::Action;
use crate::result::ActionOutcome;
use serde_json::{json, Value as JsonValue};
use std::error::Error;

/// Bulk delete of the selected records.
///
/// Asks for a danger-styled confirmation, passes the selected ids to the
/// deleter and clears the selection afterwards.
pub struct DeleteBulkAction;

impl DeleteBulkAction {
    /// Action name.
    pub const NAME: &'static str = "delete";

    /// Builds the action around a deleter returning the number of deleted records.
    pub fn make<F, E>(deleter: F) -> Action
    where
        F: Fn(&[JsonValue]) -> Result<usize, E> + Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Action::bulk(Self::NAME)
            .label("Delete selected")
            .color("danger")
            .icon("trash")
            .requires_confirmation()
            .confirm_danger()
            .modal_heading("Delete selected records")
            .modal_description("Are you sure you would like to do this? This cannot be undone.")
            .modal_submit_label("Delete")
            .deselect_records_after_completion(true)
            .handler(move |input| {
                let ids = input.record_ids();
                let deleted = deleter(&ids).map_err(Into::into)?;
                let noun = if deleted == 1 { "record" } else { "records" };
                Ok(ActionOutcome::payload(json!({
                    "message": format!("Deleted {} {}", deleted, noun),
                    "data": { "deleted": deleted },
                })))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, GatewayConfig};
    use crate::protocol::{attrs, ExecutionRequest};
    use crate::store::MemoryCallbackStore;
    use crate::token::TokenCipher;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_bulk_delete() {
        let removed: Arc<Mutex<Vec<JsonValue>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        let action = DeleteBulkAction::make(move |ids: &[JsonValue]| {
            sink.lock().unwrap().extend_from_slice(ids);
            Ok::<_, std::io::Error>(ids.len())
        });

        let gateway = Gateway::new(
            TokenCipher::from_secret("k"),
            Arc::new(MemoryCallbackStore::new()),
            GatewayConfig::default(),
        );
        let scope = gateway.session("s1");

        let attributes = action.attributes(&scope).unwrap();
        assert_eq!(attributes[attrs::DESELECT_RECORDS], "true");
        assert_eq!(attributes[attrs::BULK], "true");
        assert_eq!(attributes[attrs::CONFIRM_DANGER], "true");

        let request = ExecutionRequest::new(attributes[attrs::TOKEN].clone())
            .with_record(Some(json!([1, 2, 3])));
        let response = scope.execute(&request);

        assert!(response.body.success);
        assert_eq!(response.body.message.as_deref(), Some("Deleted 3 records"));
        assert_eq!(response.body.data, Some(json!({ "deleted": 3 })));
        assert_eq!(*removed.lock().unwrap(), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_deleter_error_fails_execution() {
        let action = DeleteBulkAction::make(|_: &[JsonValue]| Err("constraint violation"));
        let gateway = Gateway::new(
            TokenCipher::from_secret("k"),
            Arc::new(MemoryCallbackStore::new()),
            GatewayConfig::default(),
        );
        let scope = gateway.session("s1");
        let token = action.action_token(&scope).unwrap().unwrap();

        let response = scope.execute(&ExecutionRequest::new(token).with_record(Some(json!([1]))));
        assert_eq!(response.status, 500);
        assert_eq!(response.body.error_code(), Some("execution_failed"));
    }
}
