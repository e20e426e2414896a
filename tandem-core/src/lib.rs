pub mod codec;
pub mod model;
pub mod utils;

pub use codec::{CodecError, decode, decode_envelope, encode};
pub use model::*;
