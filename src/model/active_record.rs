use log::{debug, error};
use serde_json::Value;

use crate::core::item::{FieldValue, Record, ValidationErrors};

use super::{
    store::{ColumnValue, RecordStore, Row},
    FieldDefinition, FieldKind, ModelDefinition,
};

/// Attribute under which storage failures are reported.
pub const DATABASE_ERROR_ATTRIBUTE: &str = "database";

/// A record of a [`ModelDefinition`] that validates itself before being
/// inserted through a [`RecordStore`].
pub struct ActiveRecord<'a> {
    model: &'a ModelDefinition,
    store: &'a dyn RecordStore,
    values: Vec<Option<FieldValue>>,
    errors: ValidationErrors,
}

impl<'a> ActiveRecord<'a> {
    pub fn new(model: &'a ModelDefinition, store: &'a dyn RecordStore) -> Self {
        Self {
            model,
            store,
            values: vec![None; model.fields.len()],
            errors: ValidationErrors::new(),
        }
    }

    pub fn model(&self) -> &ModelDefinition {
        self.model
    }

    /// Current value of `field`, if assigned.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        let index = self.model.fields.iter().position(|f| f.name == field)?;
        self.values[index].as_ref()
    }

    /// Runs every rule, collecting messages, and returns the typed row when
    /// nothing failed.
    pub fn validate(&mut self) -> Option<Row> {
        self.errors.clear();
        let mut row = Row::with_capacity(self.model.fields.len());

        for (field, value) in self.model.fields.iter().zip(&self.values) {
            if field.read_only && value.is_none() {
                continue;
            }
            match convert(field, value.as_ref()) {
                Ok(column) => row.push((field.name.clone(), column)),
                Err(message) => self.errors.add(field.name.clone(), message),
            }
        }

        if self.errors.is_empty() {
            Some(row)
        } else {
            debug!(
                "Validation of {} failed on {} attributes",
                self.model.name,
                self.errors.len()
            );
            None
        }
    }
}

impl Record for ActiveRecord<'_> {
    fn try_set(&mut self, field: &str, value: FieldValue) -> bool {
        match self
            .model
            .fields
            .iter()
            .position(|f| f.name == field && !f.read_only)
        {
            Some(index) => {
                self.values[index] = Some(value);
                true
            }
            None => false,
        }
    }

    fn save(&mut self) -> bool {
        let Some(row) = self.validate() else {
            return false;
        };

        match self.store.insert(&self.model.table, &row) {
            Ok(()) => true,
            Err(err) => {
                error!("Unable to insert into {}: {}", self.model.table, err);
                self.errors.add(DATABASE_ERROR_ATTRIBUTE, err.to_string());
                false
            }
        }
    }

    fn errors(&self) -> ValidationErrors {
        self.errors.clone()
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(values)) => values.is_empty(),
        Some(_) => false,
    }
}

fn convert(field: &FieldDefinition, value: Option<&Value>) -> Result<ColumnValue, String> {
    let label = field.label();

    if is_empty(value) {
        return if field.required {
            Err(format!("{} cannot be blank.", label))
        } else {
            Ok(ColumnValue::Null)
        };
    }
    let Some(value) = value else {
        return Ok(ColumnValue::Null);
    };

    match field.kind {
        FieldKind::String => {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => if *flag { "1" } else { "0" }.to_string(),
                _ => return Err(format!("{} must be a string.", label)),
            };
            match field.max_length {
                Some(max) if text.chars().count() > max => Err(format!(
                    "{} should contain at most {} characters.",
                    label, max
                )),
                _ => Ok(ColumnValue::Text(text)),
            }
        }
        FieldKind::Integer => to_integer(value)
            .map(ColumnValue::Integer)
            .ok_or_else(|| format!("{} must be an integer.", label)),
        FieldKind::Number => to_number(value)
            .map(ColumnValue::Real)
            .ok_or_else(|| format!("{} must be a number.", label)),
        FieldKind::Boolean => to_boolean(value)
            .map(ColumnValue::Boolean)
            .ok_or_else(|| format!("{} must be either \"1\" or \"0\".", label)),
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            text.trim_start_matches('+').parse().ok()
        }
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        _ => None,
    }
}

fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}
