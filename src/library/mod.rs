//! Library retrieval: parameter validation, the filter/sort/paginate
//! pipeline, and the service orchestrating upstream calls around it.

pub mod pipeline;
pub mod query;
pub mod service;

pub use pipeline::GameRecord;
pub use query::{DateRange, LibraryParams, LibraryQuery, SortKey};
pub use service::{LibraryPage, LibraryService};
