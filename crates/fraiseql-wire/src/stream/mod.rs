//! Streaming abstractions

mod adaptive_chunking;
mod chunking;
mod filter;
mod json_stream;
mod memory_estimator;
mod query_stream;
mod typed_stream;

pub use adaptive_chunking::AdaptiveChunking;
pub use chunking::{ChunkingStrategy, RowChunk};
pub use filter::{FilteredStream, Predicate};
pub use json_stream::{extract_json_bytes, parse_json, JsonStream, StreamState, StreamStats};
pub use memory_estimator::{ConservativeEstimator, FixedEstimator, MemoryEstimator};
pub use query_stream::QueryStream;
pub use typed_stream::TypedJsonStream;
