//! Product registry - the set of products a run can plan over.
//!
//! Registration order is significant: it is the tie-break between
//! independent products when the plan is computed.

use std::collections::HashMap;

use crate::core::error::ConfigurationError;
use crate::core::product::Product;
use crate::products::{Alive, Llvm, Swift, Z3};

/// Registry of build products, in registration order.
pub struct ProductRegistry {
    products: Vec<Box<dyn Product>>,
    by_name: HashMap<String, usize>,
}

impl ProductRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ProductRegistry {
            products: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with all built-in products.
    pub fn builtin() -> Self {
        let mut registry = ProductRegistry::new();

        registry.insert(Box::new(Llvm));
        registry.insert(Box::new(Z3));
        registry.insert(Box::new(Alive));
        registry.insert(Box::new(Swift));

        registry
    }

    /// Register a product. Names must be unique.
    pub fn register(&mut self, product: Box<dyn Product>) -> Result<(), ConfigurationError> {
        if self.by_name.contains_key(product.name()) {
            return Err(ConfigurationError::DuplicateProduct(
                product.name().to_string(),
            ));
        }
        self.insert(product);
        Ok(())
    }

    fn insert(&mut self, product: Box<dyn Product>) {
        self.by_name
            .insert(product.name().to_string(), self.products.len());
        self.products.push(product);
    }

    /// Get a product by name.
    pub fn get(&self, name: &str) -> Option<&dyn Product> {
        self.position(name).map(|idx| self.products[idx].as_ref())
    }

    /// Get a product by registration index.
    pub fn get_index(&self, idx: usize) -> Option<&dyn Product> {
        self.products.get(idx).map(|p| p.as_ref())
    }

    /// Registration index of a product.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Look up a product, failing with suggestions when it is unknown.
    pub fn require(&self, name: &str) -> Result<&dyn Product, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownProduct {
                name: name.to_string(),
                suggestions: self.suggestions(name),
            })
    }

    /// Iterate over products in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Product> + '_ {
        self.products.iter().map(|p| p.as_ref())
    }

    /// Product names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered names that look like a misspelling of `name`.
    fn suggestions(&self, name: &str) -> Vec<String> {
        let needle = name.to_ascii_lowercase();
        self.names()
            .into_iter()
            .filter(|candidate| {
                candidate.contains(&needle)
                    || needle.contains(candidate)
                    || same_letters(candidate, &needle)
            })
            .map(str::to_string)
            .collect()
    }
}

impl Default for ProductRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Catches transpositions like `alvie` for `alive`.
fn same_letters(a: &str, b: &str) -> bool {
    let mut a: Vec<char> = a.chars().collect();
    let mut b: Vec<char> = b.chars().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
