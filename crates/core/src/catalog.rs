//! Tenant catalog records.
//!
//! These mirror the backend's `companies`, `categories` and `products`
//! rows. Optional columns default to `None` so partially filled tenants
//! (fresh sign-ups) still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, CompanyId, Price, ProductId, ProductStatus, Slug, ThemeColor, WhatsAppNumber,
};

/// A restaurant (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Company {
    /// The destination for order messages, if one is configured.
    #[must_use]
    pub fn whatsapp_number(&self) -> Option<WhatsAppNumber> {
        self.whatsapp
            .as_deref()
            .and_then(|raw| WhatsAppNumber::parse(raw).ok())
    }

    /// The accent color, ignoring values that are not valid hex.
    #[must_use]
    pub fn theme_color(&self) -> Option<ThemeColor> {
        self.primary_color
            .as_deref()
            .and_then(|raw| ThemeColor::parse(raw).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub company_id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Everything the public menu page shows for one tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub company: Company,
    /// Categories in display sequence.
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

/// One category with the products listed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection<'a> {
    pub category: &'a Category,
    pub products: Vec<&'a Product>,
}

impl Menu {
    /// Group active products under their categories.
    ///
    /// Category order is preserved and categories without any active
    /// product are left out. Products with no category are not listed.
    #[must_use]
    pub fn sections(&self) -> Vec<MenuSection<'_>> {
        self.categories
            .iter()
            .map(|category| MenuSection {
                category,
                products: self
                    .products
                    .iter()
                    .filter(|p| p.status.is_active() && p.category_id == Some(category.id))
                    .collect(),
            })
            .filter(|section| !section.products.is_empty())
            .collect()
    }

    /// Look up a product a shopper may order.
    #[must_use]
    pub fn orderable_product(&self, id: ProductId) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id && p.status.is_active())
    }
}

/// Display position for a category appended to `existing`: one past the
/// highest position in use.
#[must_use]
pub fn next_display_order(existing: &[Category]) -> i32 {
    existing
        .iter()
        .map(|c| c.display_order)
        .max()
        .map_or(0, |highest| highest.saturating_add(1))
}

/// Renumber categories to `0..n` after a deletion.
///
/// `remaining` is taken in its current display sequence (ties keep their
/// given order). Only categories whose position changes are returned, as
/// `(id, new_display_order)` pairs.
#[must_use]
pub fn resequence(remaining: &[Category]) -> Vec<(CategoryId, i32)> {
    let mut ordered: Vec<&Category> = remaining.iter().collect();
    ordered.sort_by_key(|c| c.display_order);

    ordered
        .into_iter()
        .zip(0_i32..)
        .filter(|(category, position)| category.display_order != *position)
        .map(|(category, position)| (category.id, position))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn company(whatsapp: Option<&str>) -> Company {
        Company {
            id: CompanyId::generate(),
            name: "Taquería Demo".to_owned(),
            slug: Slug::from_name("demo").unwrap(),
            phone: None,
            email: None,
            address: None,
            lat: None,
            lng: None,
            whatsapp: whatsapp.map(str::to_owned),
            logo: None,
            primary_color: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn product(name: &str, price: &str) -> Product {
        Product {
            id: ProductId::generate(),
            company_id: CompanyId::generate(),
            category_id: None,
            name: name.to_owned(),
            description: None,
            price: Price::parse(price).unwrap(),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        }
    }

    fn category(company_id: CompanyId, name: &str, order: i32) -> Category {
        Category {
            id: CategoryId::generate(),
            company_id,
            name: name.to_owned(),
            description: None,
            display_order: order,
        }
    }

    #[test]
    fn test_sections_skip_empty_categories_and_inactive_products() {
        let company = company(None);
        let drinks = category(company.id, "Bebidas", 0);
        let tacos = category(company.id, "Tacos", 1);
        let desserts = category(company.id, "Postres", 2);

        let mut pastor = product("Pastor", "2.50");
        pastor.category_id = Some(tacos.id);
        let mut hidden = product("Flan", "3");
        hidden.category_id = Some(desserts.id);
        hidden.status = ProductStatus::Inactive;
        let loose = product("Sin categoría", "1");

        let menu = Menu {
            company,
            categories: vec![drinks, tacos.clone(), desserts],
            products: vec![pastor.clone(), hidden.clone(), loose],
        };

        let sections = menu.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category.id, tacos.id);
        assert_eq!(sections[0].products, vec![&pastor]);

        assert!(menu.orderable_product(pastor.id).is_some());
        assert!(menu.orderable_product(hidden.id).is_none());
    }

    #[test]
    fn test_new_category_goes_last() {
        let company = company(None);
        let existing = vec![
            category(company.id, "Bebidas", 0),
            category(company.id, "Tacos", 1),
        ];
        assert_eq!(next_display_order(&existing), 2);
        assert_eq!(next_display_order(&[]), 0);
    }

    #[test]
    fn test_new_category_never_reuses_a_taken_position() {
        let company = company(None);
        // Renumbering after a delete stopped partway
        let existing = vec![
            category(company.id, "Bebidas", 0),
            category(company.id, "Postres", 2),
        ];
        assert_eq!(next_display_order(&existing), 3);
    }

    #[test]
    fn test_resequence_closes_gaps_and_skips_unchanged() {
        let company = company(None);
        let first = category(company.id, "Bebidas", 0);
        let third = category(company.id, "Postres", 2);
        let fourth = category(company.id, "Extras", 3);

        // "Tacos" at position 1 was deleted
        let plan = resequence(&[fourth.clone(), first, third.clone()]);
        assert_eq!(plan, vec![(third.id, 1), (fourth.id, 2)]);
    }

    #[test]
    fn test_resequence_of_contiguous_list_is_empty() {
        let company = company(None);
        let list = vec![
            category(company.id, "A", 0),
            category(company.id, "B", 1),
        ];
        assert!(resequence(&list).is_empty());
    }

    #[test]
    fn test_company_deserializes_sparse_rows() {
        let json = r#"{
            "id": "7d2f4c4e-5a0b-4b7e-9a55-1f0d3c2b1a00",
            "name": "Demo",
            "slug": "demo",
            "whatsapp": "+52 555 000 1111",
            "primary_color": "ff6600"
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.whatsapp_number().unwrap().as_str(), "525550001111");
        assert_eq!(company.theme_color().unwrap().as_str(), "#ff6600");
        assert!(company.logo.is_none());
    }

    #[test]
    fn test_product_price_accepts_backend_numbers() {
        let json = r#"{
            "id": "00000000-0000-4000-8000-000000000001",
            "company_id": "00000000-0000-4000-8000-000000000002",
            "category_id": null,
            "name": "Taco",
            "price": 2.5,
            "status": "active"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Price::from_cents(250));
    }
}
