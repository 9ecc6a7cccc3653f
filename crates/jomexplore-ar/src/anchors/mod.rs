//! Hit-testing and anchor persistence.

mod store;

pub use store::{Anchor, AnchorStore, AnchorStoreConfig};
