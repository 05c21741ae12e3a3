pub mod build;
pub mod node;
pub mod radix;
pub mod sharded;
pub mod stats;
pub mod suffix;

pub use node::Node;
pub use radix::RadixTree;
pub use sharded::ShardedSuffixIndex;
pub use stats::TreeStats;
pub use suffix::{sum_counts, SuffixTree};
