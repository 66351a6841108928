//! Small pieces of site widget logic: carousel, popup, header scroll state
//! and gallery filtering.

pub mod carousel;
pub mod gallery;
pub mod popup;
pub mod scroll;

pub use carousel::Carousel;
pub use gallery::{ALL_CATEGORIES, Categorized, filter_gallery};
pub use popup::{POPUP_DISMISSED_KEY, PopupTrigger};
pub use scroll::ScrollState;
