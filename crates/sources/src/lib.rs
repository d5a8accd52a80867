//! Source reader implementations for Kindred.

pub mod in_memory;
pub mod json_file;
pub mod record;

pub use in_memory::InMemorySource;
pub use json_file::{FixtureFile, FixtureUser, load_fixture};
pub use record::UserRecord;
