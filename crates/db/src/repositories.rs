pub mod match_log;
pub mod registration;
pub mod session;
pub mod tutor;
