//! Bitable tool catalog, endpoint resolution and gateway client.
//!
//! This crate is shared by every transport in `lark-bitable-mcp` (stdio, SSE and stateless HTTP).
//! It holds **no** protocol logic: transports decode their own envelopes and call into
//! [`ToolCatalog`] and [`Gateway`].

pub mod catalog;
pub mod error;
pub mod resolver;
pub mod runtime;
pub mod semantics;

pub use catalog::{EndpointMapping, ToolCatalog, ToolDescriptor};
pub use error::{ErrorBody, ToolError};
pub use resolver::{RESERVED_PATH_ARGUMENTS, ResolvedRequest};
pub use runtime::{Gateway, GatewayClient};
