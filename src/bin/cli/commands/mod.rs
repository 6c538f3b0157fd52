pub mod add;
pub mod due;
pub mod list;
pub mod reset;
pub mod review;
pub mod stats;
pub mod status;
