use crate::pattern::{FieldKind, FieldValue};
use thiserror::Error;

/// Crate specific Errors implementation.
///
/// Every parse error carries the expression (a single `|`-separated alternative) it was found in,
/// the field it belongs to and the offending token.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum CronError {
    /// Empty or whitespace-only cron expression.
    #[error("cron expression cannot be blank")]
    BlankExpression,
    /// Wrong number of whitespace-separated fields.
    #[error("invalid cron expression [{expr}]: expected [{min} to {max}] fields but found [{found}] fields")]
    InvalidFieldCount {
        /// Expression text.
        expr: String,
        /// Minimum allowed number of fields.
        min: usize,
        /// Maximum allowed number of fields.
        max: usize,
        /// Actual number of fields.
        found: usize,
    },
    /// Token isn't a number or a known alias.
    #[error("invalid cron expression [{expr}]: invalid numeric value [{token}] in field [{field}]")]
    InvalidNumber {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
    },
    /// Value outside the field bounds.
    #[error("invalid cron expression [{expr}]: value [{token}] out of range for field [{field}], it must be between [{min}] and [{max}]")]
    ValueOutOfRange {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
        /// Lower bound (inclusive).
        min: FieldValue,
        /// Upper bound (inclusive).
        max: FieldValue,
    },
    /// Range with wrong arity or with `from` not less than `to`.
    #[error("invalid cron expression [{expr}]: invalid range [{token}] for field [{field}]")]
    InvalidRange {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
    },
    /// Step pattern with wrong arity.
    #[error("invalid cron expression [{expr}]: invalid step [{token}] for field [{field}]")]
    InvalidStep {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
    },
    /// Nth day of week pattern with wrong arity.
    #[error("invalid cron expression [{expr}]: invalid nth day [{token}] for field [{field}], expected [day_of_week#instance]")]
    InvalidNth {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
    },
    /// Special character used in a field which doesn't allow it.
    #[error("invalid cron expression [{expr}]: [{token}] can't be used in field [{field}]")]
    UnsupportedModifier {
        /// Expression text.
        expr: String,
        /// Field the token belongs to.
        field: FieldKind,
        /// Offending token.
        token: String,
    },
    /// Field without any item, i.e. `,`.
    #[error("invalid cron expression [{expr}]: field [{field}] is empty")]
    EmptyField {
        /// Expression text.
        expr: String,
        /// Empty field.
        field: FieldKind,
    },
    /// Unknown timezone name.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    /// Unparsable ISO-8601 timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl CronError {
    /// Returns the field the error relates to, if any.
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            Self::InvalidNumber { field, .. }
            | Self::ValueOutOfRange { field, .. }
            | Self::InvalidRange { field, .. }
            | Self::InvalidStep { field, .. }
            | Self::InvalidNth { field, .. }
            | Self::UnsupportedModifier { field, .. }
            | Self::EmptyField { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_field_token_and_bound() {
        let err = CronError::ValueOutOfRange {
            expr: "60 * ? * *".into(),
            field: FieldKind::Minute,
            token: "60".into(),
            min: 0,
            max: 59,
        };

        assert_eq!(
            err.to_string(),
            "invalid cron expression [60 * ? * *]: value [60] out of range for field [minute], it must be between [0] and [59]"
        );
        assert_eq!(err.field(), Some(FieldKind::Minute));
    }

    #[test]
    fn test_field_is_absent_for_non_field_errors() {
        assert_eq!(CronError::BlankExpression.field(), None);
        assert_eq!(CronError::InvalidTimezone("Mars/Base".into()).field(), None);
    }
}
