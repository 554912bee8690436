pub mod approval;
pub mod error;
pub mod events;
pub mod hours;
pub mod visibility;
