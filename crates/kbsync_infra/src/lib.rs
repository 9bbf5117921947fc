mod fs;
mod graphql;
mod infra;
mod qdrant;
mod row_source;

pub use fs::{encode_table, KbFileService};
pub use graphql::HttpGraphqlClient;
pub use infra::*;
pub use qdrant::QdrantVectorStore;
pub use row_source::FileRowSource;
