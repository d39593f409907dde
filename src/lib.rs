//! # proxy-link-verifier
//!
//! Verifies proxy share-links (`vless://`, `vmess://`, `trojan://`, `ss://`)
//! by normalizing each link into a canonical descriptor, rendering a client
//! configuration document for it, and launching a real proxy-client process
//! to observe whether it stays alive past a grace window.
//!
//! The liveness heuristic is deliberately shallow: a client process that is
//! still running at the end of the grace window is classified as working. No
//! assertion is made that traffic actually flows through the tunnel.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod link;
pub mod pipeline;
pub mod render;
pub mod verify;
mod utils;

pub use config::{VerifierConfig, VerifierConfigBuilder};
pub use descriptor::{ConfigDescriptor, ProtocolFamily};
pub use error::{ParseError, RenderError};
pub use link::LinkScheme;
pub use pipeline::Pipeline;
pub use render::render_client_config;
pub use verify::{FailureReason, VerificationRunner, Verdict};
