//! Release versions and the tags that carry them

pub mod tag;
pub mod version;

pub use tag::Tag;
pub use version::Version;
