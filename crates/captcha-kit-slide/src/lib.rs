//! Slider captcha solvers.
//!
//! Two strategies are provided:
//! - [`slide_match`]: find a (possibly transparent) puzzle piece in a
//!   background by correlating Canny edge maps,
//! - [`slide_comparison`]: find the gap by differencing the background with
//!   and without the cut-out.
//!
//! Both are total over decoded rasters; degenerate inputs produce sentinel
//! positions rather than errors.

mod canny;
mod diff_match;
mod edge_match;
mod template;

pub use canny::{canny, CannyParams};
pub use diff_match::{
    abs_difference, binarize, find_gap, slide_comparison, slide_comparison_with, DiffMatchParams,
    SlideComparisonResult,
};
pub use edge_match::{slide_match, slide_match_with, SlideMatchResult};
pub use template::{match_template, TemplateMatch};
