pub mod cdn;
pub mod dispatch;
pub mod jwt;
