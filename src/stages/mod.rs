//! Stage adapters.
//!
//! Each adapter wraps one transformation behind the [`Stage`] trait so
//! pipeline assembly stays a pure function of task options. Adapters are
//! deliberately narrow: they receive the full asset batch, transform or
//! filter it, and hand it on.
//!
//! [`Stage`]: crate::pipeline::Stage

mod changed;
mod concat;
mod css;
mod debug_log;
mod dep_order;
mod header;
mod html_min;
mod image_min;
mod include;
mod js_min;
mod localize;
mod rename;
mod sourcemap;
mod strip_debug;
mod write;

pub use changed::Changed;
pub use concat::Concat;
pub use css::{CssCompile, CssPost};
pub use debug_log::DebugLog;
pub use dep_order::DepOrder;
pub use header::Header;
pub use html_min::HtmlMin;
pub use image_min::{is_optimizable, ImageMin};
pub use include::FileInclude;
pub use js_min::{JsCompress, JsMinify};
pub use localize::Localize;
pub use rename::Rename;
pub use sourcemap::{SourcemapInit, SourcemapWrite};
pub use strip_debug::StripDebug;
pub use write::Write;
