mod config;
pub use config::ConfigCredentialProvider;

mod static_;
pub use static_::StaticCredentialProvider;
