#[doc(hidden)]
pub mod frame;
#[doc(hidden)]
pub mod units;

#[doc(inline)]
pub use frame::{Frame, FrameDetails, TransformContext, TransformError};
#[doc(inline)]
pub use units::{convert, DistanceUnit};
