//! External service integrations.

pub mod bitrix_client {
    pub use crate::bitrix_client::*;
}
