pub mod activity;
pub mod badge;
pub mod cache;
pub mod error;
pub mod ranking;
pub mod report;

pub use activity::*;
pub use badge::*;
pub use cache::*;
pub use error::*;
pub use ranking::*;
pub use report::*;
