use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Postal address nested inside client forms.
pub struct AddressForm {
    #[serde(default)]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Form data for registering or editing a client.
pub struct ClientForm {
    /// Full name or company name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Contact email address.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[validate(nested)]
    pub contact_address: AddressForm,
}
