pub mod conversation;
pub mod countdown;
pub mod domain;
pub mod ports;
pub mod script;

#[cfg(test)]
mod proptests;

pub use conversation::{transition, ConversationEngine, Reply, Transition, TransitionError};
pub use countdown::{CountdownError, CycleCountdown, RolloverCallback};
pub use domain::{
    ConversationState, ConversationStep, LeadProfile, Message, RemainingTime, Rollover,
    RolloverKind, Sender,
};
pub use ports::{
    AnchorStore, Clock, ManualClock, MemoryAnchorStore, PortError, PortResult, SystemClock,
};
