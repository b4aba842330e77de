pub mod pool;

pub use pool::TaskPool;
