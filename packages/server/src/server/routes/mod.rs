// HTTP routes
pub mod derive;
pub mod health;
pub mod ingest;
pub mod objects;
pub mod research;
pub mod tools;

pub use derive::*;
pub use health::*;
pub use ingest::*;
pub use objects::*;
pub use research::*;
pub use tools::*;
