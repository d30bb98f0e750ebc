pub mod constants;
pub mod device;
pub mod gateway;
pub mod helpers;
pub mod interfaces;
pub mod sensors;
