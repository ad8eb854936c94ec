// Quickbase JSON API client and response reshaping helpers
pub mod auth;
pub mod cache;
pub mod client;
pub mod field;
pub mod query;
pub mod response;

// Re-export core types for convenience
pub use auth::UserToken;
pub use cache::{CacheError, ResponseCache};
pub use client::{ClientError, InsertResponse, QueryOptions, QuickbaseClient};
pub use field::{CatalogError, FieldCatalog, FieldDescriptor, FieldType};
pub use query::{Group, QueryError, Sort, SortOrder, Where, QUERY_OPERATORS};
pub use response::{
    Cell, CellShape, CellValue, ConvertKind, ConvertOptions, Metadata, Operation, Orientation,
    QueryResponse, Record, RecordCollection, TransformError, TransformKind,
};
