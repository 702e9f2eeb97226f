//! Client-side form checks.
//!
//! These mirror the required-field checks the storefront forms run before
//! anything is sent. They are not business rules: the server re-validates
//! every payload and its answer wins. Failures are collected per field so a
//! front end can show inline text next to each input.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

use crate::models::{OrderInput, PaymentOption, Product, ProductInput};

lazy_static! {
    /// Loose email shape check, the server owns real verification
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// http(s) URL for product images and demo videos
    static ref MEDIA_URL_REGEX: Regex =
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();

    /// Phone number: digits with optional leading +, spaces and dashes
    static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();

    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref LOWERCASE_REGEX: Regex = Regex::new(r"[a-z]").unwrap();
}

const MIN_PASSWORD_LEN: usize = 6;

/// Field name to messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages for a single field
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Builder for collecting field errors
#[derive(Debug, Default)]
pub struct FieldErrorsBuilder {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrorsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Add `message` for `field` when `value` is blank
    pub fn require(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return Ok(()) if no errors, or the collected errors
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors {
                errors: self.errors,
            })
        }
    }
}

/// Validate the add/update product form
pub fn validate_product(input: &ProductInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrorsBuilder::new();

    errors
        .require("name", &input.name, "Product name is required")
        .require("description", &input.description, "Description is required")
        .require("category", &input.category, "Category is required");

    if !(input.price.is_finite() && input.price > 0.0) {
        errors.add("price", "Price must be greater than 0");
    }

    if input.available_quantity < 1 {
        errors.add("availableQuantity", "Available quantity must be at least 1");
    }

    if input.moq < 1 {
        errors.add("moq", "Minimum order quantity must be at least 1");
    } else if input.moq > input.available_quantity {
        errors.add(
            "moq",
            "Minimum order quantity cannot exceed available quantity",
        );
    }

    if input.images.is_empty() {
        errors.add("images", "At least one image is required");
    }
    for url in &input.images {
        if !MEDIA_URL_REGEX.is_match(url) {
            errors.add("images", format!("Invalid image URL: {}", url));
        }
    }

    if let Some(video) = input.demo_video.as_deref().filter(|v| !v.is_empty()) {
        if !MEDIA_URL_REGEX.is_match(video) {
            errors.add("demoVideo", "Demo video must be an http(s) URL");
        }
    }

    errors.finish()
}

/// Buyer-entered part of the booking form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub first_name: String,
    pub last_name: String,
    pub quantity: u32,
    pub contact_number: String,
    pub delivery_address: String,
    pub additional_notes: String,
}

/// Total shown on the booking form: quantity times unit price, in cents precision
pub fn order_price(unit_price: f64, quantity: u32) -> f64 {
    (unit_price * f64::from(quantity) * 100.0).round() / 100.0
}

/// Validate the booking form against the product being ordered
pub fn validate_booking(form: &BookingForm, product: &Product) -> Result<(), FieldErrors> {
    let mut errors = FieldErrorsBuilder::new();

    errors
        .require("firstName", &form.first_name, "First name is required")
        .require("lastName", &form.last_name, "Last name is required")
        .require(
            "deliveryAddress",
            &form.delivery_address,
            "Delivery address is required",
        );

    if form.contact_number.trim().is_empty() {
        errors.add("contactNumber", "Contact number is required");
    } else if !PHONE_REGEX.is_match(form.contact_number.trim()) {
        errors.add("contactNumber", "Contact number is not valid");
    }

    if form.quantity < product.moq {
        errors.add(
            "quantity",
            format!("Minimum order quantity is {}", product.moq),
        );
    }
    if form.quantity > product.available_quantity {
        errors.add(
            "quantity",
            format!("Only {} pieces available", product.available_quantity),
        );
    }

    errors.finish()
}

/// Build the booking payload once the form passes its checks
pub fn build_order(
    form: &BookingForm,
    product: &Product,
    buyer_email: &str,
) -> Result<OrderInput, FieldErrors> {
    validate_booking(form, product)?;

    Ok(OrderInput {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        buyer_email: buyer_email.to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        quantity: form.quantity,
        order_price: order_price(product.price, form.quantity),
        payment_option: product.payment_option,
        contact_number: form.contact_number.trim().to_string(),
        delivery_address: form.delivery_address.trim().to_string(),
        additional_notes: form.additional_notes.trim().to_string(),
    })
}

/// Whether placing this order needs a checkout session first
pub fn needs_checkout(order: &OrderInput) -> bool {
    order.payment_option == PaymentOption::PayFirst
}

/// Validate the registration form
pub fn validate_registration(
    display_name: &str,
    email: &str,
    password: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrorsBuilder::new();

    errors.require("displayName", display_name, "Name is required");

    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_REGEX.is_match(email.trim()) {
        errors.add("email", "Invalid email format");
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if !UPPERCASE_REGEX.is_match(password) {
        errors.add("password", "Password must contain an uppercase letter");
    }
    if !LOWERCASE_REGEX.is_match(password) {
        errors.add("password", "Password must contain a lowercase letter");
    }

    errors.finish()
}

/// Validate the admin suspend dialog
pub fn validate_suspension(reason: &str, feedback: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrorsBuilder::new();
    errors
        .require("suspendReason", reason, "Suspend reason is required")
        .require("suspendFeedback", feedback, "Feedback is required");
    errors.finish()
}

/// Validate the manager's add-tracking dialog
pub fn validate_tracking_update(status: &str, location: Option<&str>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrorsBuilder::new();
    errors.require("status", status, "Tracking status is required");
    if let Some(location) = location {
        if location.len() > 120 {
            errors.add("location", "Location is too long (max 120 characters)");
        }
    }
    errors.finish()
}
