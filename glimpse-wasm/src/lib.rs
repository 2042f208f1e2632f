mod engine;
mod logger;

pub use engine::RoomEngine;
