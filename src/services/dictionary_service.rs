//! Key/value table editing.

use crate::functional::expiry::Clock;
use crate::functional::validation_engine::FormEngine;
use crate::models::dictionary::{DictionaryRow, RowPart};
use crate::models::field::FieldValue;

impl<C: Clock> FormEngine<C> {
    /// Change handler for one side of a row. The row is valid only while
    /// both its key and its value are.
    pub fn update_dictionary_row(
        &self,
        row: &DictionaryRow,
        part: RowPart,
        value: impl Into<FieldValue>,
    ) -> DictionaryRow {
        let mut updated = row.clone();
        let field = updated.part_mut(part);
        field.value = value.into();
        field.is_touched = true;
        self.validate_in_place(field);

        updated.is_valid_row = updated.key.is_valid && updated.value.is_valid;
        updated
    }
}

pub fn all_rows_valid(rows: &[DictionaryRow]) -> bool {
    rows.iter().all(|row| row.is_valid_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::{FieldDescriptor, Rule};

    fn tag_row(engine: &FormEngine) -> DictionaryRow {
        let key = FieldDescriptor::text("Key").rule(Rule::Required).rule(Rule::AlphaNumLower);
        let value = FieldDescriptor::text("Value").rule(Rule::Required);
        DictionaryRow::new(engine.validate(&key), engine.validate(&value))
    }

    #[test]
    fn row_is_valid_once_both_sides_are() {
        let engine = FormEngine::new();
        let row = tag_row(&engine);
        assert!(!row.is_valid_row);

        let row = engine.update_dictionary_row(&row, RowPart::Key, "env");
        assert!(row.key.is_touched);
        assert!(!row.is_valid_row);

        let row = engine.update_dictionary_row(&row, RowPart::Value, "prod");
        assert!(row.is_valid_row);
        assert!(all_rows_valid(&[row.clone()]));

        let row = engine.update_dictionary_row(&row, RowPart::Key, "Env!");
        assert!(!row.is_valid_row);
        assert!(!row.part(RowPart::Key).is_valid);
        assert!(!all_rows_valid(&[row]));
    }

    #[test]
    fn empty_table_is_valid() {
        assert!(all_rows_valid(&[]));
    }
}
