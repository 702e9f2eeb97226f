//! Product catalogue records.

use serde::{Deserialize, Serialize};

use super::PaymentOption;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub available_quantity: u32,
    /// Minimum order quantity
    #[serde(default = "default_moq")]
    pub moq: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_video: Option<String>,
    pub payment_option: PaymentOption,
    #[serde(default)]
    pub show_on_home: bool,
    #[serde(default)]
    pub manager_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_moq() -> u32 {
    1
}

impl Product {
    /// First image, used as the card thumbnail
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn in_stock(&self) -> bool {
        self.available_quantity >= self.moq
    }
}

/// Payload for creating or replacing a product (manager only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub available_quantity: u32,
    pub moq: u32,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_video: Option<String>,
    pub payment_option: PaymentOption,
    pub show_on_home: bool,
}

impl From<Product> for ProductInput {
    fn from(p: Product) -> Self {
        Self {
            name: p.name,
            description: p.description,
            category: p.category,
            price: p.price,
            available_quantity: p.available_quantity,
            moq: p.moq,
            images: p.images,
            demo_video: p.demo_video,
            payment_option: p.payment_option,
            show_on_home: p.show_on_home,
        }
    }
}

/// One page of the product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
}

impl ProductPage {
    /// Number of pages for the given page size
    pub fn page_count(&self, limit: u32) -> u64 {
        if limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(limit))
    }
}

/// Query parameters for the product listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }

    /// Query string pairs, skipping empty filters
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }

    /// Cache key parameters in a fixed order
    pub fn key_params(&self) -> Vec<String> {
        vec![
            self.page.to_string(),
            self.limit.to_string(),
            self.search.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_decodes_server_shape() {
        let json = r#"{
            "_id": "p1",
            "name": "Denim Jacket",
            "description": "Heavy denim",
            "category": "Jacket",
            "price": 42.5,
            "availableQuantity": 500,
            "moq": 50,
            "images": ["https://img/1.jpg", "https://img/2.jpg"],
            "paymentOption": "PayFirst",
            "showOnHome": true,
            "managerEmail": "m@example.com"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(product.moq, 50);
        assert_eq!(product.cover_image(), Some("https://img/1.jpg"));
        assert!(product.demo_video.is_none());
        assert!(product.in_stock());
    }

    #[test]
    fn test_page_count() {
        let page = ProductPage {
            products: vec![],
            total: 25,
        };
        assert_eq!(page.page_count(6), 5);
        assert_eq!(page.page_count(0), 0);
    }

    #[test]
    fn test_filter_query_pairs_skip_blank_search() {
        let mut filter = ProductFilter::new(2, 9);
        filter.search = Some("   ".to_string());
        filter.category = Some("Shirt".to_string());
        let pairs = filter.query_pairs();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("category", "Shirt".to_string())));
    }
}
