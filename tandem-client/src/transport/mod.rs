mod loopback;

pub use loopback::{LoopbackChannel, LoopbackRelay, ROOM_CAPACITY};
