//! The bwt_algorithms module forms the sorting subsystem of the block coder.
//!
//! The Burrow-Wheeler Transform reorders a block so that bytes which precede similar contexts
//! land next to each other. This makes runs of identical bytes much more likely, which the
//! move-to-front and run-length stages then turn into a few cheap symbols.
//!
//! The transform requires sorting every rotation of the block. The reverse only needs the last
//! column and the key, and runs in linear time.
//!
pub mod bwt_sort;
