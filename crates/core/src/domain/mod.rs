pub mod intent;
pub mod request;
pub mod session;
pub mod slots;
