mod archive;
mod grouping;
mod hierarchy;
mod post;
mod weighted_tags;

pub use archive::*;
pub use grouping::*;
pub use hierarchy::*;
pub use post::*;
pub use weighted_tags::*;

#[cfg(test)]
pub(crate) use post::fixtures;
