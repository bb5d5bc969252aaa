mod now;

pub use now::now_unix;
