//! Request handlers for the JSON API, stream relay, and image proxy.

pub mod api;
pub mod img;
pub mod relay;

pub use api::{api_detail, api_search};
pub use img::{ImgParams, img_proxy};
pub use relay::{RelayParams, stream_relay};
