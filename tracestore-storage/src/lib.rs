//! The storage backend contract: a uniform read/write interface for
//! spans, archive spans, dependencies, and sampling state, implemented by
//! heterogeneous backends behind one set of traits.

mod error;
mod query_params;
mod traits;

pub use error::{StorageError, StorageResult};
pub use query_params::{TraceQueryParameters, DEFAULT_NUM_TRACES};
pub use traits::{
    ArchiveFactory, DependencyReader, DependencyWriter, SamplingStore, SpanReader, SpanWriter,
};
