pub mod event;
pub mod give_up;
pub mod log;
pub mod puzzle;
pub mod record;
pub mod replay;
pub mod session;
