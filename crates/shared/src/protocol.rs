
use serde::{Deserialize, Serialize};

use crate::{
    domain::{OptionEntry, OptionValue},
    error::ApiError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WidgetRequest {
    /// A user pick on the control at `position` (0-based, document order).
    Select {
        position: usize,
        value: OptionValue,
    },
    GetSelected,
    GetSelectedPairs,
    SetSelected {
        values: Vec<OptionValue>,
    },
    Reset,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub position: usize,
    pub selected: OptionValue,
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WidgetResponse {
    Changed {
        appended: bool,
        removed: usize,
        control_count: usize,
    },
    Selected {
        values: Vec<OptionValue>,
    },
    SelectedPairs {
        pairs: Vec<OptionEntry>,
    },
    Skipped {
        values: Vec<OptionValue>,
    },
    Snapshot {
        controls: Vec<ControlSnapshot>,
    },
    Ack,
    Error(ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn select_request_uses_tagged_payload() {
        let raw = r#"{"type":"select","payload":{"position":1,"value":"2"}}"#;
        let request: WidgetRequest = serde_json::from_str(raw).expect("parse request");
        assert_eq!(
            request,
            WidgetRequest::Select {
                position: 1,
                value: OptionValue::from("2"),
            }
        );
    }

    #[test]
    fn unit_requests_parse_without_payload() {
        let request: WidgetRequest =
            serde_json::from_str(r#"{"type":"get_selected_pairs"}"#).expect("parse request");
        assert_eq!(request, WidgetRequest::GetSelectedPairs);
    }

    #[test]
    fn error_response_serializes_snake_case_code() {
        let response = WidgetResponse::Error(ApiError::new(ErrorCode::NotFound, "no control"));
        let json = serde_json::to_string(&response).expect("serialize response");
        assert_eq!(
            json,
            r#"{"type":"error","payload":{"code":"not_found","message":"no control"}}"#
        );
    }
}
