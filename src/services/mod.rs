pub mod ai_service;
pub mod catalog_service;
pub mod grading_service;
pub mod mcq_parser;
