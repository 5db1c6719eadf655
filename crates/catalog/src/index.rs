use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::CatalogError;
use crate::materials::ALL_MATERIALS;
use crate::model::Supplier;
use crate::states::state_code;

/// `{stateCode}-{cityName}`, e.g. `31-Sete Lagoas`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityKey(String);

impl CityKey {
    pub fn new(state_code: u8, city_name: &str) -> Self {
        CityKey(format!("{state_code}-{city_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn state_code(&self) -> Option<u8> {
        self.0.split_once('-')?.0.parse().ok()
    }

    pub fn city_name(&self) -> &str {
        self.0.split_once('-').map(|(_, name)| name).unwrap_or("")
    }
}

impl Borrow<str> for CityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Suppliers grouped by municipality.
///
/// Within a city, suppliers keep the order they had in the fetched list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SupplierIndex {
    by_city: BTreeMap<CityKey, Vec<Supplier>>,
    material_types: Vec<String>,
    supplier_count: usize,
}

impl SupplierIndex {
    pub fn build(suppliers: Vec<Supplier>) -> Result<Self, CatalogError> {
        let mut index = SupplierIndex::default();

        for supplier in suppliers {
            let code = state_code(&supplier.state.abbr).ok_or_else(|| {
                CatalogError::UnknownState {
                    supplier_id: supplier.id,
                    abbr: supplier.state.abbr.clone(),
                }
            })?;

            if !supplier.material_type.is_empty()
                && !index.material_types.contains(&supplier.material_type)
            {
                index.material_types.push(supplier.material_type.clone());
            }

            let key = CityKey::new(code, &supplier.city.name);
            index.by_city.entry(key).or_default().push(supplier);
            index.supplier_count += 1;
        }

        Ok(index)
    }

    /// Decodes the raw `/api/suppliers/` body and indexes it.
    pub fn from_json(body: Value) -> Result<Self, CatalogError> {
        let suppliers: Vec<Supplier> =
            serde_json::from_value(body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        Self::build(suppliers)
    }

    pub fn suppliers(&self, key: &str) -> Option<&[Supplier]> {
        self.by_city.get(key).map(|v| v.as_slice())
    }

    pub fn has_suppliers(&self, key: &str) -> bool {
        self.by_city.contains_key(key)
    }

    pub fn city_keys(&self) -> impl Iterator<Item = &CityKey> {
        self.by_city.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CityKey, &[Supplier])> {
        self.by_city.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Distinct material types, in first-seen order.
    pub fn material_types(&self) -> &[String] {
        &self.material_types
    }

    /// Options for the material filter control: the "all" sentinel first.
    pub fn filter_options(&self) -> Vec<String> {
        std::iter::once(ALL_MATERIALS.to_string())
            .chain(self.material_types.iter().cloned())
            .collect()
    }

    pub fn city_count(&self) -> usize {
        self.by_city.len()
    }

    pub fn supplier_count(&self) -> usize {
        self.supplier_count
    }

    pub fn is_empty(&self) -> bool {
        self.supplier_count == 0
    }
}
