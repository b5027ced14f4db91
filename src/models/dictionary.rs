use serde_derive::{Deserialize, Serialize};

use crate::models::field::FieldDescriptor;

/// One row of an editable key/value table (tags, labels, metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryRow {
    pub key: FieldDescriptor,
    pub value: FieldDescriptor,
    #[serde(default)]
    pub is_valid_row: bool,
}

impl DictionaryRow {
    pub fn new(key: FieldDescriptor, value: FieldDescriptor) -> Self {
        let is_valid_row = key.is_valid && value.is_valid;
        Self {
            key,
            value,
            is_valid_row,
        }
    }

    pub fn part(&self, part: RowPart) -> &FieldDescriptor {
        match part {
            RowPart::Key => &self.key,
            RowPart::Value => &self.value,
        }
    }

    pub(crate) fn part_mut(&mut self, part: RowPart) -> &mut FieldDescriptor {
        match part {
            RowPart::Key => &mut self.key,
            RowPart::Value => &mut self.value,
        }
    }
}

/// Side of a [`DictionaryRow`] being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPart {
    Key,
    Value,
}
