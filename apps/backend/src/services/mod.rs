pub mod progression;
pub mod rooms;
pub mod session;
