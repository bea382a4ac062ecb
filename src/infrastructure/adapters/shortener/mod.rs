//! Shortener Adapter - 短链接服务

mod http_url_shortener;

pub use http_url_shortener::HttpUrlShortener;
