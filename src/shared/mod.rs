pub mod errors;
pub mod macros;
pub mod structs;

pub use errors::DispatchError;
pub use structs::Behaviour;
pub use structs::Call;
pub use structs::CallSnapshot;
pub use structs::CallStatus;
pub use structs::CarSnapshot;
pub use structs::Command;
pub use structs::Direction;
pub use structs::DoorState;
pub use structs::Event;
pub use structs::SchedulerSnapshot;
