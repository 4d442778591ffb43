//! Course-code resolution and link aggregation.

pub mod aggregate;
pub mod resolve;
pub mod store;

pub use aggregate::{aggregate, share_link, LinkMap};
pub use resolve::FolderResolver;
pub use store::LinkStore;
