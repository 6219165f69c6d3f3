pub mod commands;
pub mod gateway;
pub mod kakao;
pub mod model;
pub mod paypal;
pub mod toss;
