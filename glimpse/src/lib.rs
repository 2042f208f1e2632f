pub use glimpse_core::model::{SessionId, UserId};

pub mod model {
    pub use glimpse_core::model::*;
}

pub mod codec {
    pub use glimpse_core::codec::*;
}

pub mod settings {
    pub use glimpse_core::settings::*;
}

pub mod state {
    pub use glimpse_core::state::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use glimpse_wasm::*;
}
