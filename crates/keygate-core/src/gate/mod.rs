//! Session gating: which surface the user sees, and why.
//!
//! - `Surface` / `Presentation`: the two mutually exclusive surfaces and the
//!   windowing seam, with a `SurfaceRegistry` keyed by surface kind
//! - `SessionGate`: the state machine driven by lifecycle events

pub mod session;
pub mod surface;

pub use session::{Completion, GateState, SessionGate, SessionState};
pub use surface::{Presentation, Surface, SurfaceRegistry, SurfaceWindow};
