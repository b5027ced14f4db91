pub mod dictionary_service;
pub mod form_service;
