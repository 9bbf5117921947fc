mod config;
mod environment;
mod error;
mod graphql;
mod knowledge;
mod record;
mod services;
mod tally;
mod transfer;
mod vector;

pub use config::*;
pub use environment::*;
pub use error::*;
pub use graphql::*;
pub use knowledge::*;
pub use record::*;
pub use services::*;
pub use tally::*;
pub use transfer::*;
pub use vector::*;
