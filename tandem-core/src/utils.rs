pub const DEFAULT_STUN_ADDR: &str = "stun:openrelay.metered.ca:80";

pub const DEFAULT_TURN_ADDR: &str = "turn:openrelay.metered.ca:80";
pub const DEFAULT_TURN_ADDR_2: &str = "turn:openrelay.metered.ca:443";
pub const DEFAULT_TURN_ADDR_3: &str = "turn:openrelay.metered.ca:443?transport=tcp";

/// Public credentials of the openrelay project TURN service.
pub const DEFAULT_TURN_USERNAME: &str = "openrelayproject";
pub const DEFAULT_TURN_CREDENTIAL: &str = "openrelayproject";

pub const DEFAULT_VIDEO_WIDTH: u32 = 350;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 350;
