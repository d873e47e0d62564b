pub mod config; pub use config::*;
pub mod error; pub use error::*;
pub mod node; pub use node::*;
pub mod leaf_node; pub use leaf_node::*; // leaf variant and leaf key partition
pub mod inner_node; pub use inner_node::*; // internal variant: routing, separators, partition
pub mod node_table; pub use node_table::*; // the arena that owns every node
pub mod bp_tree; pub use bp_tree::*;
pub mod leaf_chain; pub use leaf_chain::*; // ordered traversal over `next` links
pub mod display; // level view and `fmt::Display` for diagnostics
