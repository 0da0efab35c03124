pub mod company;
pub mod report;
pub mod result;
pub mod session;
