//! Surface Realizer: turns abstract phrase trees into finished English text.
//!
//! A tree of phrases, words and document elements annotated with
//! grammatical features is ordered by the syntax stage, inflected by the
//! morphology stage and punctuated by the orthography stage.

pub mod core;
pub mod schema;
