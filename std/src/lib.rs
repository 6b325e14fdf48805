//! Stock outposts: predicates, redirects, logging and delays.

pub mod units;

pub mod prelude {
    pub use crate::units::debug::LogOutpost;
    pub use crate::units::flow::DelayOutpost;
    pub use crate::units::logic::{FilterOutpost, RedirectUnless};
}
