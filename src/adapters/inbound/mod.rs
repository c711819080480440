pub mod request_pool;
pub mod robot_http;
pub mod ws_topics;

pub use request_pool::*;
pub use robot_http::*;
pub use ws_topics::*;
