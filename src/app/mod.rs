use crate::model::{ExpenseDraft, FormOutcome};
use crate::ui::{AppState, ToastLevel};
use tracing::info;

/// Messages raised by the form callbacks and drained by the event loop.
#[derive(Debug)]
pub enum AppMsg {
    Submitted(ExpenseDraft),
    Cancelled,
}

#[derive(Debug)]
pub enum Effect {
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    Close(FormOutcome),
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    match msg {
        Submitted(draft) => {
            state.dbg(format!(
                "submit: {} on {} ({})",
                draft.amount, draft.date, draft.description
            ));
            info!(mode = state.config.mode().as_str(), "closing form with expense");
            vec![Effect::Close(FormOutcome::Submitted(draft))]
        }
        Cancelled => {
            state.dbg("cancel");
            info!(mode = state.config.mode().as_str(), "closing form without expense");
            vec![Effect::Close(FormOutcome::Cancelled)]
        }
    }
}
