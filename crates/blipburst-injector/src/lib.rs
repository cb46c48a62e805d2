pub mod caller;
pub mod clock;
pub mod error;
pub mod injector;
pub mod options;
pub mod schedule;
pub mod shared;

pub use caller::NetworkCaller;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AttemptError, FailureMode, SimulatedFailure};
pub use injector::FaultInjector;
pub use options::{InjectorConfig, InjectorOptions};
pub use schedule::{Decision, PassReason, Schedule, ScheduleSnapshot, ScheduleState};
pub use shared::SharedInjector;
