//! Template type-checking
//!
//! Lowers bound templates into type-check blocks: TypeScript functions whose
//! statements mirror the template, so that checking the function checks the
//! template. Diagnostics of the checked code map back onto the template
//! through span comments.

pub mod api;
pub mod src;
