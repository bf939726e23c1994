use serde::{Deserialize, Serialize};

/// A product or service that can be put on an invoice by id.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogItem {
    pub name: String,
    pub hsn: String,
    pub rate: f64,
}
