pub mod driver;
pub mod pacer;
pub mod page;
pub mod unattended;
