//! Production-friendly observability hooks for chat gateway operations.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use robserve::{
//!     FanoutGatewayHooks, MetricsGatewayHooks, SafeGatewayHooks, TracingGatewayHooks,
//! };
//!
//! let hooks = FanoutGatewayHooks::new()
//!     .with(Arc::new(SafeGatewayHooks::new(TracingGatewayHooks)))
//!     .with(Arc::new(MetricsGatewayHooks));
//! assert_eq!(hooks.len(), 2);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsGatewayHooks;
pub use safe_hooks::{FanoutGatewayHooks, SafeGatewayHooks};
pub use tracing_hooks::TracingGatewayHooks;

pub mod prelude {
    pub use crate::{
        FanoutGatewayHooks, MetricsGatewayHooks, SafeGatewayHooks, TracingGatewayHooks,
    };
}
