//! Outpost facade crate.
//!
//! Re-exports the core data model, the runtime engine and the stock
//! outposts behind one entry point. Outpost never routes: the host router
//! drives it through [`HostRouter`](runtime::HostRouter).
//!
//! ```rust,ignore
//! use outpost::prelude::*;
//!
//! let engine = Engine::install(router, EngineConfig::new().log(true));
//! engine.register_unit(OutpostDef::route("auth").decide(|ctx: NavContext| async move {
//!     if ctx.to.query.contains_key("token") { Ok(ctx.next()) } else { Ok(ctx.redirect_to("login")) }
//! }));
//! engine.attach_to_route("admin", "auth");
//! ```

pub use outpost_core as core;
pub use outpost_runtime as runtime;
#[cfg(feature = "std")]
pub use outpost_std as std;

pub use outpost_core::{EngineConfig, Outcome, OutpostDef, Phase, Reply, Scope, declare_outposts};
pub use outpost_runtime::Engine;

pub mod prelude {
    pub use outpost_core::prelude::*;
    pub use outpost_runtime::prelude::*;
    #[cfg(feature = "std")]
    pub use outpost_std::prelude::*;
}
