//! Core document tree, styling, shape locators, the heuristic patcher and the
//! deck builder for slide presentations.

pub mod builder;
pub mod error;
pub mod locator;
pub mod outline;
pub mod patch;
pub mod style;
pub mod types;
pub mod units;

pub use builder::{Agenda, ContentBlock, Cover, DeckBuilder, DeckSpec, SlideSpec};
pub use error::{Error, Result};
pub use locator::{Locator, Region, SlideSelector};
pub use patch::{
    MatchMode, OverlapPolicy, PatchEvent, PatchReport, PatchRule, PatchSet, Patcher, Replacement,
    SlidePatch,
};
pub use style::{StyleConfig, TextRole, TextStyle, Typefaces};
pub use types::{Document, FileFormat, Paragraph, Run, RunProps, Shape, ShapeKind, Slide};
pub use units::{Emu, Rect, Rgb};
