mod engine;
mod operations;
mod signed_url;
