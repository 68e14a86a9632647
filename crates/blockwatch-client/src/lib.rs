pub mod config;
pub mod prober;
pub mod transport;

pub use config::ProxyConfig;
pub use prober::ReqwestProber;
pub use transport::{BLOCK_SIGNATURE, ProbeConfig, build_client};
