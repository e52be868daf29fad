//! preset-convert library
//!
//! Walks a directory of plugin presets and impulse responses, decodes each
//! file with `preset-codec`, and writes into a mirrored output tree:
//!
//! - a `<file>.json` summary per input
//! - the unwrapped component data of `.vstpreset` files (`.fxp`, `.fxb`, `.ffp`)
//! - `.vstpreset` re-wraps of `.fxp`/`.fxb` programs and banks
//!
//! A file that fails to decode is logged and counted; the batch carries on.

pub mod batch;
pub mod config;
pub mod convert;
pub mod summary;

pub use batch::{BatchReport, run};
pub use config::ConvertConfig;
pub use convert::{InputKind, Outcome, convert_file};
