pub use geocast_core::{RoleLogic, StoreLogic};
pub mod data {
    pub use geocast_data::*;
}
pub mod config {
    pub use geocast_core::config::*;
}
pub mod driver {
    pub use geocast_core::driver::*;
}
pub mod gradient {
    pub use geocast_core::gradient::*;
}
pub mod history {
    pub use geocast_core::history::*;
}
pub mod metric {
    pub use geocast_core::metric::*;
}
pub mod metrics {
    pub use geocast_core::metrics::*;
}
pub mod mobility {
    pub use geocast_core::mobility::*;
}
pub mod network {
    pub use geocast_core::network::*;
}
pub mod relay {
    pub use geocast_core::relay::*;
}
pub mod role {
    pub use geocast_core::role::*;
}
pub mod snapshot {
    pub use geocast_core::snapshot::*;
}
pub mod spatial_hash {
    pub use geocast_core::spatial_hash::*;
}
pub mod store {
    pub use geocast_core::store::*;
}
