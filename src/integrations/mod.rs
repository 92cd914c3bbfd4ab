//! External service integrations.

pub mod provider {
    pub use crate::provider::*;
}

pub mod query {
    pub use crate::query::*;
}
