pub mod plate_ctx;
pub mod session;

pub use plate_ctx::PlateCtx;
pub use session::Session;
