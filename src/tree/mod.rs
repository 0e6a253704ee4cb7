pub mod demo;
pub mod edges;
pub mod export;
pub mod layout;
pub mod model;
pub mod selection;
pub mod session;
pub mod style;
pub mod timeline;
pub mod viewport;
