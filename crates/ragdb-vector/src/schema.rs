use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// The store has no dimension of its own: `dim` always comes from the
/// embedding provider the table is paired with.
pub fn build_snippet_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("resource_id", DataType::Utf8, true),
        Field::new("content", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
        Field::new("embedder_id", DataType::Utf8, false),
        Field::new(
            "ingested_at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
    ]))
}
