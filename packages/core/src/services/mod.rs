pub mod app_state;
pub mod clock;
pub mod notifier;

pub use app_state::AppStateHandle;
pub use clock::{ManualClock, SystemClock};
pub use notifier::{RecordingNotifier, TracingNotifier};
