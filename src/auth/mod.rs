pub mod google;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;
pub mod session;
