//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Product stock status.
///
/// Maps to the commerce API's `stock_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    #[serde(rename = "instock")]
    InStock,
    #[serde(rename = "outofstock")]
    OutOfStock,
}

impl StockStatus {
    /// Whether the product can currently be purchased.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        matches!(self, Self::InStock)
    }
}
