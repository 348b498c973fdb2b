// Lexicon - A persistent translation store that remembers what is missing
//
// This library stores translations as flat records behind a repository trait,
// resolves nested keys with exact-vs-namespace semantics and records stubs for
// every key an application asks for but nobody has translated yet.

mod lexicon;

pub use lexicon::{DynRepository, Lexicon};

// Re-export the store
pub use lexicon_store::*;

// Re-export logging
pub use lexicon_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::Lexicon;
    pub use lexicon_store::prelude::*;
}
