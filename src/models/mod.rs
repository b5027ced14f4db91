pub mod dictionary;
pub mod field;
pub mod form;
