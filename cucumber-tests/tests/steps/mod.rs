pub mod authentication_steps;
pub mod logout_steps;
