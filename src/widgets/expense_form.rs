use crate::model::ExpenseDraft;
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info, warn};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseField {
    Amount,
    Date,
    Description,
}

impl ExpenseField {
    pub const ALL: [ExpenseField; 3] = [
        ExpenseField::Amount,
        ExpenseField::Date,
        ExpenseField::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExpenseField::Amount => "amount",
            ExpenseField::Date => "date",
            ExpenseField::Description => "description",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseField::Amount => "Amount",
            ExpenseField::Date => "Date",
            ExpenseField::Description => "Description",
        }
    }
}

/// Current text of one input plus whether it passed the last submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub is_valid: bool,
}

impl FieldState {
    fn new(value: String) -> Self {
        Self {
            value,
            is_valid: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseInputs {
    pub amount: FieldState,
    pub date: FieldState,
    pub description: FieldState,
}

impl ExpenseInputs {
    fn from_defaults(defaults: Option<&ExpenseDraft>) -> Self {
        match defaults {
            Some(d) => Self {
                amount: FieldState::new(d.amount.to_string()),
                date: FieldState::new(d.date.format(DATE_FORMAT).to_string()),
                description: FieldState::new(d.description.clone()),
            },
            None => Self {
                amount: FieldState::new(String::new()),
                date: FieldState::new(String::new()),
                description: FieldState::new(String::new()),
            },
        }
    }

    pub fn get(&self, field: ExpenseField) -> &FieldState {
        match field {
            ExpenseField::Amount => &self.amount,
            ExpenseField::Date => &self.date,
            ExpenseField::Description => &self.description,
        }
    }

    fn get_mut(&mut self, field: ExpenseField) -> &mut FieldState {
        match field {
            ExpenseField::Amount => &mut self.amount,
            ExpenseField::Date => &mut self.date,
            ExpenseField::Description => &mut self.description,
        }
    }
}

/// Per-field result of one submit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldValidity {
    pub amount: bool,
    pub date: bool,
    pub description: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Rejected(FieldValidity),
}

/// Numeric and strictly positive. Surrounding whitespace is ignored.
pub fn parse_amount(text: &str) -> Option<f64> {
    let n = text.trim().parse::<f64>().ok()?;
    (n.is_finite() && n > 0.0).then_some(n)
}

/// A real calendar date written as YYYY-MM-DD.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn parse_description(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

type CancelFn = Box<dyn FnMut()>;
type SubmitFn = Box<dyn FnMut(ExpenseDraft)>;

/// Amount / date / description input state with the change, submit and
/// cancel handlers. Validity is optimistic: every edit marks its field valid
/// and flags are only recomputed by [`ExpenseForm::on_submit`].
pub struct ExpenseForm {
    submit_button_label: String,
    inputs: ExpenseInputs,
    on_cancel: CancelFn,
    on_submit: SubmitFn,
}

impl fmt::Debug for ExpenseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpenseForm")
            .field("submit_button_label", &self.submit_button_label)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl ExpenseForm {
    pub fn new(
        submit_button_label: impl Into<String>,
        on_cancel: impl FnMut() + 'static,
        on_submit: impl FnMut(ExpenseDraft) + 'static,
        default_values: Option<&ExpenseDraft>,
    ) -> Self {
        Self {
            submit_button_label: submit_button_label.into(),
            inputs: ExpenseInputs::from_defaults(default_values),
            on_cancel: Box::new(on_cancel),
            on_submit: Box::new(on_submit),
        }
    }

    pub fn submit_button_label(&self) -> &str {
        &self.submit_button_label
    }

    pub fn inputs(&self) -> &ExpenseInputs {
        &self.inputs
    }

    pub fn on_field_change(&mut self, field: ExpenseField, value: impl Into<String>) {
        let slot = self.inputs.get_mut(field);
        slot.value = value.into();
        slot.is_valid = true;
        debug!(field = field.name(), "field changed");
    }

    pub fn on_submit(&mut self) -> SubmitOutcome {
        let amount = parse_amount(&self.inputs.amount.value);
        let date = parse_date(&self.inputs.date.value);
        let description = parse_description(&self.inputs.description.value);
        let validity = FieldValidity {
            amount: amount.is_some(),
            date: date.is_some(),
            description: description.is_some(),
        };

        if let (Some(amount), Some(date), Some(description)) = (amount, date, description) {
            info!(amount, %date, "expense submitted");
            (self.on_submit)(ExpenseDraft {
                amount,
                date,
                description,
            });
            return SubmitOutcome::Submitted;
        }

        warn!(
            amount = validity.amount,
            date = validity.date,
            description = validity.description,
            "expense rejected"
        );
        self.inputs.amount.is_valid = validity.amount;
        self.inputs.date.is_valid = validity.date;
        self.inputs.description.is_valid = validity.description;
        SubmitOutcome::Rejected(validity)
    }

    pub fn on_cancel(&mut self) {
        info!("expense form cancelled");
        (self.on_cancel)();
    }

    /// Drives the summary error line only.
    pub fn form_is_invalid(&self) -> bool {
        ExpenseField::ALL
            .iter()
            .any(|f| !self.inputs.get(*f).is_valid)
    }
}
