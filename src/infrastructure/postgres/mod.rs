pub mod extraction_adapter;

pub use extraction_adapter::PostgresExtractionAdapter;
