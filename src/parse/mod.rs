//! Parsers for the human-oriented text BIRD prints on its control socket
//!
//! Both parsers work the same way: each line is classified on its own into a
//! small set of line kinds, then a reducer folds the classified lines into
//! records. Lines that match nothing are skipped, so output from other BIRD
//! versions degrades to missing fields rather than errors.

mod protocols;
mod routes;

pub use protocols::parse_protocols;
pub use routes::parse_routes;
