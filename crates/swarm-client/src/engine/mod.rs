pub mod admission;
pub mod cycler;
pub mod report;
pub mod tracker;
pub mod worker;
