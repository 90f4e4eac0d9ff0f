pub mod bucket;
pub mod bucket_set;
pub mod symbology;

pub use bucket::*;
pub use bucket_set::*;
pub use symbology::*;
