pub mod element;
pub mod features;
pub mod lexicon;
