pub use crate::clock::{Clock, ManualClock, SystemClock, now, set_clock};
pub use crate::config::{RuntimeConfig, config};
pub use crate::effects::{Dispose, disposable_effect, effect, on_unmount};
pub use crate::error::{IntoRendered, RenderError, ResourceError, component, raise};
pub use crate::executor::{PostHandle, post, sleep, spawn};
pub use crate::resource::{Completion, DeferredResource, Read, ResourceStatus, with_timeout};
pub use crate::runtime::{
    Frame, Scheduler, TickStats, keyed, remember, remember_state, remember_state_with_key,
    remember_with_key, request_frame,
};
pub use crate::signal::{Signal, signal};
pub use crate::telemetry::{ErrorLog, ErrorLogEntry, FailureRecord};
pub use crate::view::{Callback, View, ViewId, ViewKind};
pub use web_time::Duration;
