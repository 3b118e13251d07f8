pub mod clock;
pub mod coordinator;
pub mod observer;
pub mod playback;
pub mod session;
pub mod timer;
pub mod voice;

// Re-export the pieces hosts need to run a set
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{CoordinatorOptions, SetCoordinator};
pub use observer::{StateObserver, Subscription};
pub use playback::{CuePlayer, PlayerCall, RecordingPlayer};
pub use session::{SessionHandle, WorkoutSession};
pub use voice::{ConsoleVoice, VoiceStyle};
