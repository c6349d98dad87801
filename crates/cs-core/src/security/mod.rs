pub mod secret;
pub mod token;

pub use secret::SecretString;
pub use token::looks_like_github_token;
