//! Per-test state machines
//!
//! Each machine owns its phase, timestamps and collected data, advances only
//! through [`Screen`](crate::runner::Screen) calls, and exposes its Session
//! Result through [`Assessment`](crate::runner::Assessment) once it has
//! finished naturally.

pub mod digit_span;
pub mod dsst;
pub mod feelings;
pub mod pvt;
pub mod sleepiness;

pub use digit_span::{DigitSpan, DigitSpanRecord, DigitSpanScore, Direction, SpanTrial};
pub use dsst::{Dsst, DsstRecord, DsstScore};
pub use feelings::{Feelings, FeelingsLayout, FeelingsRecord};
pub use pvt::{Pvt, PvtRecord, PvtResponse, ReactionStats};
pub use sleepiness::{Sleepiness, SleepinessRecord};
