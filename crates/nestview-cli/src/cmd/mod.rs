pub mod context;
pub mod nav;
pub mod reduce;
pub mod stats;
pub mod tree;
