pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod extract;
pub mod fetch;
pub mod lock;
pub mod pipeline;
pub mod record;
pub mod screenshots;
pub mod url_model;
pub mod walkthrough;
