pub mod build;
pub mod edit;
pub mod export;
pub mod init;
pub mod inspect;
pub mod list;
pub mod onboarding;
pub mod timeline;
pub mod view;
