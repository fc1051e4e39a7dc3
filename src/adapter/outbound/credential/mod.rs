//! Credential loading and persistence adapters.

mod env_file;

pub use env_file::{
    EnvFileCredentials, ACCESS_TOKEN_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY,
    REFRESH_TOKEN_KEY,
};
