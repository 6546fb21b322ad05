// Domain-layer modules and shared errors/models
pub mod mapping {
    pub use crate::mapping::*;
}

pub mod lead_models {
    pub use crate::lead_models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
