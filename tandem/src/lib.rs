pub use tandem_core::model::Identity;

pub mod model {
    pub use tandem_core::model::*;
}

pub mod codec {
    pub use tandem_core::codec::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_client::*;
}

#[cfg(feature = "rtc")]
pub mod rtc {
    pub use tandem_rtc::*;
}
