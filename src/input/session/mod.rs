mod core;
mod pointer;
mod touch;

pub use core::{
    CommitTicket, DrawingState, InputState, SessionSettings, TimerCommand, TouchSession,
};
