//! Action dispatch for hosts that drive the engine with serialized requests.

use shared::{
    error::{ApiError, ErrorCode},
    protocol::{WidgetRequest, WidgetResponse},
};

use crate::{EngineError, HostSurface, SelectionSetEngine};

pub fn handle_request<H: HostSurface>(
    engine: &mut SelectionSetEngine<H>,
    request: WidgetRequest,
) -> Result<WidgetResponse, ApiError> {
    match request {
        WidgetRequest::Select { position, value } => {
            let control = engine.controls().get(position).cloned().ok_or_else(|| {
                ApiError::new(
                    ErrorCode::NotFound,
                    format!("no control at position {position}"),
                )
            })?;
            let offered = engine
                .host()
                .list_option_entries(&control)
                .iter()
                .any(|e| e.value == value);
            if !offered {
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    format!("control at position {position} does not offer value {value}"),
                ));
            }

            engine.host_mut().set_selected_value(&control, &value);
            let outcome = engine.on_control_changed(&control)?;
            Ok(WidgetResponse::Changed {
                appended: outcome.appended.is_some(),
                removed: outcome.removed.len(),
                control_count: engine.controls().len(),
            })
        }
        WidgetRequest::GetSelected => Ok(WidgetResponse::Selected {
            values: engine.selected_values(),
        }),
        WidgetRequest::GetSelectedPairs => Ok(WidgetResponse::SelectedPairs {
            pairs: engine.selected_entries(),
        }),
        WidgetRequest::SetSelected { values } => {
            let skipped = engine.set_selected_values(&values);
            if skipped.is_empty() {
                Ok(WidgetResponse::Ack)
            } else {
                Ok(WidgetResponse::Skipped { values: skipped })
            }
        }
        WidgetRequest::Reset => {
            engine.reset();
            Ok(WidgetResponse::Ack)
        }
        WidgetRequest::Snapshot => Ok(WidgetResponse::Snapshot {
            controls: engine.snapshot(),
        }),
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let code = match &err {
            EngineError::UnknownControl(_) => ErrorCode::NotFound,
            EngineError::DuplicateSelection { .. } => ErrorCode::Conflict,
            EngineError::Invariant(_) => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}
