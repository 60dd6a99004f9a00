pub mod classify;
pub mod error;
pub mod index;
pub mod resolve;
pub mod schema;
pub mod table;

#[cfg(test)]
mod fixtures;

pub use classify::*;
pub use error::*;
pub use index::*;
pub use resolve::*;
pub use schema::*;
pub use table::*;
