//! Products the cart endpoints price from server-side, plus the
//! listing the product pages read.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use storefront_core::Money;

/// A size or colour option of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    pub value: String,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Money,

    /// Crossed-out price shown next to `price`.
    pub compare_at_price: Option<Money>,

    pub tags: Vec<String>,
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// True when `variant_id` is one of this product's options.
    pub fn has_variant(&self, variant_id: &str) -> bool {
        self.variants.iter().any(|v| v.id == variant_id)
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
}

/// Listing filters and pagination. `page` starts at 1.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<ProductSort>,

    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            category: None,
            search: None,
            sort_by: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Read-only product list.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        ProductCatalog {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id.trim())
    }

    /// Returns one page of matching products and the total match count.
    ///
    /// Without a sort the listing is ordered by id.
    pub fn list(&self, filter: &ProductFilter) -> (Vec<Product>, usize) {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |c| p.category.eq_ignore_ascii_case(c.trim()))
            })
            .filter(|p| needle.as_deref().map_or(true, |n| p.matches_search(n)))
            .collect();

        matches.sort_by(|a, b| a.id.cmp(&b.id));
        match filter.sort_by {
            Some(ProductSort::PriceAsc) => matches.sort_by_key(|p| p.price),
            Some(ProductSort::PriceDesc) => matches.sort_by_key(|p| std::cmp::Reverse(p.price)),
            None => {}
        }

        let total = matches.len();
        let limit = filter.limit.max(1);
        let start = filter.page.max(1).saturating_sub(1).saturating_mul(limit);
        let page = matches.into_iter().skip(start).take(limit).cloned().collect();
        (page, total)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        let variants = |options: &[(&str, &str, &str)]| {
            options
                .iter()
                .map(|(id, name, value)| ProductVariant {
                    id: id.to_string(),
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect()
        };
        let tags = |list: &[&str]| list.iter().map(|t| t.to_string()).collect();

        ProductCatalog::new([
            Product {
                id: "1".to_string(),
                name: "Zapatillas Deportivas".to_string(),
                category: "calzado".to_string(),
                price: Money::from_cents(8999),
                compare_at_price: Some(Money::from_cents(11999)),
                tags: tags(&["deporte", "running", "comodidad"]),
                variants: variants(&[
                    ("1-1", "Talla", "39"),
                    ("1-2", "Talla", "40"),
                    ("1-3", "Talla", "41"),
                    ("1-4", "Talla", "42"),
                ]),
            },
            Product {
                id: "2".to_string(),
                name: "Camiseta Algodón Premium".to_string(),
                category: "ropa".to_string(),
                price: Money::from_cents(2999),
                compare_at_price: Some(Money::from_cents(3999)),
                tags: tags(&["camiseta", "algodón", "casual"]),
                variants: variants(&[
                    ("2-1", "Talla", "S"),
                    ("2-2", "Talla", "M"),
                    ("2-3", "Talla", "L"),
                    ("2-4", "Talla", "XL"),
                ]),
            },
            Product {
                id: "3".to_string(),
                name: "Smartwatch Fitness Pro".to_string(),
                category: "accesorios".to_string(),
                price: Money::from_cents(14999),
                compare_at_price: Some(Money::from_cents(19999)),
                tags: tags(&["reloj", "tecnología", "fitness"]),
                variants: variants(&[("3-1", "Color", "Negro"), ("3-2", "Color", "Plata")]),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_get_trims_id() {
        let products = ProductCatalog::default();
        let shirt = products.get(" 2 ").unwrap();

        assert_eq!(shirt.name, "Camiseta Algodón Premium");
        assert_eq!(shirt.price, Money::from_cents(2999));
        assert!(products.get("99").is_none());
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let products = ProductCatalog::default();

        let (all, total) = products.list(&ProductFilter::default());
        assert_eq!(total, 3);
        assert_eq!(ids(&all), ["1", "2", "3"]);

        let filter = ProductFilter {
            sort_by: Some(ProductSort::PriceDesc),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&products.list(&filter).0), ["3", "1", "2"]);

        let filter = ProductFilter {
            category: Some("ROPA".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&products.list(&filter).0), ["2"]);

        let filter = ProductFilter {
            search: Some("Fitness".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&products.list(&filter).0), ["3"]);
    }

    #[test]
    fn test_list_pagination() {
        let products = ProductCatalog::default();
        let filter = ProductFilter {
            page: 2,
            limit: 2,
            ..ProductFilter::default()
        };

        let (page, total) = products.list(&filter);
        assert_eq!(total, 3);
        assert_eq!(ids(&page), ["3"]);
    }

    #[test]
    fn test_has_variant() {
        let products = ProductCatalog::default();
        let shoes = products.get("1").unwrap();
        assert!(shoes.has_variant("1-2"));
        assert!(!shoes.has_variant("2-2"));
    }
}
