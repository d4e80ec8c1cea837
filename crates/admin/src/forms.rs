//! Admin form parsing.
//!
//! Each posted form is a plain `Deserialize` struct of strings; `parse`
//! turns it into the typed input the Supabase client writes, or a
//! [`AppError::Validation`] with the message shown to the owner.

use menudigital_core::{
    CategoryId, CompanyId, Email, Price, PriceError, ProductStatus, Slug, ThemeColor,
    WhatsAppNumber,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::supabase::{CategoryChanges, CompanySettings, ProductInput, ProfileChanges};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Trimmed value, or `None` when blank.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(value: &str, message: &str) -> Result<String> {
    optional(value).ok_or_else(|| invalid(message))
}

fn email(value: &str) -> Result<Email> {
    Email::parse(value).map_err(|_| invalid("Correo electrónico inválido"))
}

fn whatsapp(value: &str) -> Result<Option<String>> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };
    WhatsAppNumber::parse(&raw).map_err(|_| invalid("El número de WhatsApp debe contener dígitos"))?;
    Ok(Some(raw))
}

fn coordinate(value: &str, limit: f64, message: &str) -> Result<Option<f64>> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };
    let parsed: f64 = raw.parse().map_err(|_| invalid(message))?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(invalid(message));
    }
    Ok(Some(parsed))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty password.
    pub fn parse(&self) -> Result<Email> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("Ingresa tu contraseña"));
        }
        Ok(email)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated sign-up data.
#[derive(Debug)]
pub struct Registration {
    pub business_name: String,
    pub email: Email,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns a validation error for a blank business name, a malformed
    /// email or a short password.
    pub fn parse(&self) -> Result<Registration> {
        let business_name = required(&self.business_name, "El nombre del negocio es obligatorio")?;
        let email = email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(invalid("La contraseña debe tener al menos 6 caracteres"));
        }
        Ok(Registration {
            business_name,
            email,
        })
    }
}

// =============================================================================
// Company
// =============================================================================

/// Settings and onboarding form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub name: String,
    /// Blank means "derive from the name".
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub primary_color: String,
}

impl SettingsForm {
    /// # Errors
    ///
    /// Returns a validation error for a blank name, a slug without letters
    /// or digits, a WhatsApp number without digits, or a bad color.
    pub fn parse(&self) -> Result<CompanySettings> {
        let name = required(&self.name, "El nombre es obligatorio")?;
        let slug_source = optional(&self.slug).unwrap_or_else(|| name.clone());
        let slug = Slug::from_name(&slug_source)
            .map_err(|_| invalid("El slug debe contener letras o números"))?;
        let primary_color = optional(&self.primary_color)
            .map(|raw| ThemeColor::parse(&raw))
            .transpose()
            .map_err(|_| invalid("El color debe ser un valor hexadecimal como #ff6600"))?
            .map(|color| color.to_string());

        Ok(CompanySettings {
            name,
            slug,
            whatsapp: whatsapp(&self.whatsapp)?,
            primary_color,
        })
    }
}

/// Restaurant profile fields. The logo arrives separately as a file part.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
}

impl ProfileForm {
    /// Record a text field from the multipart body. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "whatsapp" => &mut self.whatsapp,
            "address" => &mut self.address,
            "lat" => &mut self.lat,
            "lng" => &mut self.lng,
            _ => return,
        };
        *slot = value;
    }

    /// # Errors
    ///
    /// Returns a validation error for a blank name, a malformed email, a
    /// WhatsApp number without digits or out-of-range coordinates.
    pub fn parse(&self) -> Result<ProfileChanges> {
        Ok(ProfileChanges {
            name: required(&self.name, "El nombre es obligatorio")?,
            phone: optional(&self.phone),
            email: optional(&self.email)
                .map(|raw| email(&raw).map(Email::into_inner))
                .transpose()?,
            whatsapp: whatsapp(&self.whatsapp)?,
            address: optional(&self.address),
            lat: coordinate(&self.lat, 90.0, "La latitud debe estar entre -90 y 90")?,
            lng: coordinate(&self.lng, 180.0, "La longitud debe estar entre -180 y 180")?,
            logo: None,
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    /// # Errors
    ///
    /// Returns a validation error for a blank name.
    pub fn parse(&self) -> Result<CategoryChanges> {
        Ok(CategoryChanges {
            name: required(&self.name, "El nombre es obligatorio")?,
            description: optional(&self.description),
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    /// Blank means "no category".
    #[serde(default)]
    pub category_id: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub active: Option<String>,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns a validation error for a blank name, a bad or negative
    /// price, a non-http(s) image URL or a malformed category id.
    pub fn parse(&self, company_id: CompanyId) -> Result<ProductInput> {
        let name = required(&self.name, "El nombre es obligatorio")?;

        let price = Price::parse(&self.price).map_err(|e| match e {
            PriceError::Negative => invalid("El precio no puede ser negativo"),
            PriceError::Invalid => invalid("El precio debe ser un número"),
        })?;
        let price = Price::new(price.amount().round_dp(2))
            .map_err(|_| invalid("El precio no puede ser negativo"))?;

        let image = optional(&self.image)
            .map(|raw| match Url::parse(&raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(raw),
                _ => Err(invalid("La URL de la imagen no es válida")),
            })
            .transpose()?;

        let category_id = optional(&self.category_id)
            .map(|raw| raw.parse::<CategoryId>())
            .transpose()
            .map_err(|_| invalid("Categoría inválida"))?;

        Ok(ProductInput {
            company_id,
            category_id,
            name,
            description: optional(&self.description),
            price,
            image,
            status: ProductStatus::from_checkbox(self.active.is_some()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(err: AppError) -> String {
        err.public_message()
    }

    #[test]
    fn test_register_rules() {
        let form = RegisterForm {
            business_name: "  ".to_string(),
            email: "dueno@example.com".to_string(),
            password: "secreto".to_string(),
        };
        assert_eq!(
            message(form.parse().unwrap_err()),
            "El nombre del negocio es obligatorio"
        );

        let form = RegisterForm {
            business_name: "Taquería".to_string(),
            email: "dueno@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert_eq!(
            message(form.parse().unwrap_err()),
            "La contraseña debe tener al menos 6 caracteres"
        );

        let form = RegisterForm {
            business_name: " Taquería ".to_string(),
            email: "dueno@example.com".to_string(),
            password: "123456".to_string(),
        };
        let registration = form.parse().unwrap();
        assert_eq!(registration.business_name, "Taquería");
    }

    #[test]
    fn test_login_requires_valid_email() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(message(form.parse().unwrap_err()), "Correo electrónico inválido");
    }

    #[test]
    fn test_settings_slug_defaults_to_name() {
        let form = SettingsForm {
            name: "Café La Única".to_string(),
            ..SettingsForm::default()
        };
        let settings = form.parse().unwrap();
        assert_eq!(settings.slug.as_str(), "cafe-la-unica");
        assert_eq!(settings.whatsapp, None);
        assert_eq!(settings.primary_color, None);
    }

    #[test]
    fn test_settings_normalizes_slug_and_color() {
        let form = SettingsForm {
            name: "Demo".to_string(),
            slug: "Mi Restaurante!".to_string(),
            whatsapp: "+52 555 000 1111".to_string(),
            primary_color: "FF6600".to_string(),
        };
        let settings = form.parse().unwrap();
        assert_eq!(settings.slug.as_str(), "mi-restaurante");
        assert_eq!(settings.whatsapp.as_deref(), Some("+52 555 000 1111"));
        assert_eq!(settings.primary_color.as_deref(), Some("#ff6600"));
    }

    #[test]
    fn test_settings_rejects_bad_values() {
        let form = SettingsForm {
            name: "Demo".to_string(),
            whatsapp: "sin número".to_string(),
            ..SettingsForm::default()
        };
        assert!(form.parse().is_err());

        let form = SettingsForm {
            name: "Demo".to_string(),
            primary_color: "naranja".to_string(),
            ..SettingsForm::default()
        };
        assert!(form.parse().is_err());
    }

    #[test]
    fn test_profile_coordinates() {
        let mut form = ProfileForm::default();
        form.set("name", "Demo".to_string());
        form.set("lat", "19.4326".to_string());
        form.set("lng", "-99.1332".to_string());
        form.set("unknown", "ignored".to_string());
        let changes = form.parse().unwrap();
        assert_eq!(changes.lat, Some(19.4326));
        assert_eq!(changes.lng, Some(-99.1332));

        form.set("lat", "91".to_string());
        assert_eq!(
            message(form.parse().unwrap_err()),
            "La latitud debe estar entre -90 y 90"
        );
    }

    #[test]
    fn test_profile_blank_fields_clear_columns() {
        let mut form = ProfileForm::default();
        form.set("name", "Demo".to_string());
        form.set("phone", "   ".to_string());
        let changes = form.parse().unwrap();
        assert_eq!(changes.phone, None);
        assert_eq!(changes.email, None);
    }

    #[test]
    fn test_product_form_parsing() {
        let company_id = CompanyId::generate();
        let category = CategoryId::generate();
        let form = ProductForm {
            name: " Taco al pastor ".to_string(),
            description: String::new(),
            price: "25.499".to_string(),
            image: "https://cdn.example.com/taco.jpg".to_string(),
            category_id: category.to_string(),
            active: Some("on".to_string()),
        };
        let input = form.parse(company_id).unwrap();
        assert_eq!(input.name, "Taco al pastor");
        assert_eq!(input.price.fixed(), "25.50");
        assert_eq!(input.category_id, Some(category));
        assert_eq!(input.description, None);
        assert_eq!(input.status, ProductStatus::Active);
    }

    #[test]
    fn test_product_form_rejections() {
        let company_id = CompanyId::generate();
        let base = || ProductForm {
            name: "Taco".to_string(),
            price: "10".to_string(),
            ..ProductForm::default()
        };

        let unchecked = base().parse(company_id).unwrap();
        assert_eq!(unchecked.status, ProductStatus::Inactive);
        assert_eq!(unchecked.category_id, None);

        let form = ProductForm {
            price: "-1".to_string(),
            ..base()
        };
        assert_eq!(
            message(form.parse(company_id).unwrap_err()),
            "El precio no puede ser negativo"
        );

        let form = ProductForm {
            price: "diez".to_string(),
            ..base()
        };
        assert_eq!(
            message(form.parse(company_id).unwrap_err()),
            "El precio debe ser un número"
        );

        let form = ProductForm {
            image: "javascript:alert(1)".to_string(),
            ..base()
        };
        assert!(form.parse(company_id).is_err());
    }
}
