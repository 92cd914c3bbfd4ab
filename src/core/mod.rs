// Domain-layer modules and shared errors/models
pub mod errors {
    pub use crate::errors::*;
}

pub mod filters {
    pub use crate::filters::*;
}

pub mod listing {
    pub use crate::listing::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod search {
    pub use crate::search::*;
}
