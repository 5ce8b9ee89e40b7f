//! Reader for ROS bag format 2.0.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), rosbag::BagError> {
//! use rosbag::{Bag, Query};
//!
//! let bag = Bag::open("recording.bag")?;
//! let view = bag.view(&Query::topics(["/chatter"]));
//! for entry in &view {
//!     let msg = bag.instance(entry)?;
//!     println!("{} {} {} bytes", msg.time(), msg.topic(), msg.size());
//! }
//! # Ok(())
//! # }
//! ```

mod bag;
mod error;
mod header;
mod time;
mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bag::{Bag, Connection, IndexEntry};
pub use error::BagError;
pub use time::Time;
pub use view::{MessageInstance, Query, View};
