pub mod builtin;
pub mod normalizer;
pub mod taxonomy;
pub mod text;
