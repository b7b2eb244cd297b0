//! Built-in filters.
//!
//! Each filter is a plain struct implementing
//! [`Filter`](crate::filter::Filter): parameter fields, a static schema,
//! and one `plan` body shared by preflight and execute. Numeric work lives
//! in free-standing kernels dispatched through [`crate::dispatch`].

pub mod create_image;
pub mod find_maxima;
pub mod gray_to_rgb;
pub mod threshold;

pub use create_image::CreateImageFilter;
pub use find_maxima::{find_maxima, FindMaximaFilter, Peak};
pub use gray_to_rgb::GrayToRgbFilter;
pub use threshold::ManualThresholdFilter;
