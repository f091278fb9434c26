pub mod ask;
pub mod define;
pub mod evaluate;
pub mod roast;
pub mod session;
