pub mod probe;
pub mod upstream;

pub use upstream::{StubUpstream, TEST_API_KEY, unreachable_base_url};
