pub mod framework;

pub use mock_mme::{MockMme, build_s11};
pub use mock_network::{DataPlaneEvent, MockNetwork, PolicyEvent};
