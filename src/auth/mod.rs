pub mod extract;
pub mod password;
pub mod session;
pub mod validation;
