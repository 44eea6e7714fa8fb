use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::theme::ThemeMode;

/// Parsed, typed record handed to the caller on a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Edit => "edit",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    // Confirm button text; falls back to "Add" / "Update" depending on mode
    #[serde(default)]
    pub submit_button_label: Option<String>,
    // Prefill for edit mode; absent means blank fields
    #[serde(default)]
    pub default_values: Option<ExpenseDraft>,
    // Raise an error toast on a rejected submit. Off by default.
    #[serde(default)]
    pub alert_on_invalid: bool,
    #[serde(default)]
    pub theme: ThemeMode,
}

impl AppConfig {
    pub fn mode(&self) -> FormMode {
        if self.default_values.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    pub fn submit_label(&self) -> String {
        match &self.submit_button_label {
            Some(label) => label.clone(),
            None => match self.mode() {
                FormMode::Create => "Add".to_string(),
                FormMode::Edit => "Update".to_string(),
            },
        }
    }
}

pub(crate) fn validate_app_config(cfg: &AppConfig) -> Result<(), String> {
    if let Some(label) = &cfg.submit_button_label {
        if label.trim().is_empty() {
            return Err("submit_button_label must not be blank".to_string());
        }
    }
    if let Some(d) = &cfg.default_values {
        if !d.amount.is_finite() {
            return Err(format!(
                "default_values.amount must be a finite number, got {}",
                d.amount
            ));
        }
    }
    Ok(())
}

/// How the form was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Submitted(ExpenseDraft),
    Cancelled,
}

/// `{ok,type,data}` object written to stdout when the form closes.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub ok: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a ExpenseDraft>,
}

impl<'a> From<&'a FormOutcome> for Envelope<'a> {
    fn from(outcome: &'a FormOutcome) -> Self {
        match outcome {
            FormOutcome::Submitted(draft) => Envelope {
                ok: true,
                kind: "expense",
                data: Some(draft),
            },
            FormOutcome::Cancelled => Envelope {
                ok: false,
                kind: "cancelled",
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn config_parses_edit_mode_defaults() {
        let yaml = r#"
default_values:
  amount: 59.99
  date: 2023-05-01
  description: Groceries
alert_on_invalid: true
theme: light
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.mode(), FormMode::Edit);
        assert_eq!(cfg.submit_label(), "Update");
        assert!(cfg.alert_on_invalid);
        assert_eq!(cfg.theme, ThemeMode::Light);
        let d = cfg.default_values.unwrap();
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_eq!(d.description, "Groceries");
    }

    #[test]
    fn empty_config_is_create_mode() {
        let cfg: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.mode(), FormMode::Create);
        assert_eq!(cfg.submit_label(), "Add");
        assert!(!cfg.alert_on_invalid);
        assert_eq!(cfg.theme, ThemeMode::Dark);
    }

    #[test]
    fn explicit_label_wins_over_mode_default() {
        let cfg: AppConfig = serde_yaml::from_str("submit_button_label: Save").unwrap();
        assert_eq!(cfg.submit_label(), "Save");
    }

    #[test]
    fn validate_rejects_blank_label() {
        let cfg = AppConfig {
            submit_button_label: Some("   ".into()),
            ..Default::default()
        };
        let err = validate_app_config(&cfg).unwrap_err();
        assert!(err.contains("submit_button_label"));
    }

    #[test]
    fn envelope_shapes_match_outcome() {
        let outcome = FormOutcome::Submitted(ExpenseDraft {
            amount: 12.5,
            date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            description: "lunch".into(),
        });
        let v = serde_json::to_value(Envelope::from(&outcome)).unwrap();
        assert_eq!(
            v,
            json!({
                "ok": true,
                "type": "expense",
                "data": {"amount": 12.5, "date": "2023-05-01", "description": "lunch"}
            })
        );

        let v = serde_json::to_value(Envelope::from(&FormOutcome::Cancelled)).unwrap();
        assert_eq!(v, json!({"ok": false, "type": "cancelled"}));
    }
}
