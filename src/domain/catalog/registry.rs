//! Catalog registry - validated, read-only collection of device profiles.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::domain::foundation::Category;

use super::{CatalogError, DeviceProfile, DimensionSchema};

/// The catalog bundled with the crate.
const BUILTIN_CATALOG_YAML: &str = include_str!("../../../catalog/pump_catalog.yaml");

static BUILTIN_CATALOG: Lazy<Result<Catalog, CatalogError>> =
    Lazy::new(|| Catalog::from_yaml(BUILTIN_CATALOG_YAML));

/// On-disk catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: String,
    schema: DimensionSchema,
    devices: Vec<DeviceProfile>,
}

/// Validated device catalog.
///
/// Loaded once at startup and shared read-only. Device order is the
/// insertion order of the source document and is used as the final
/// tie-breaker everywhere.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    schema: DimensionSchema,
    devices: Vec<DeviceProfile>,
    index: HashMap<String, usize>,
}

/// Compact, serializable view of one category, sent to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogExcerpt {
    pub category: Category,
    pub devices: Vec<ExcerptDevice>,
}

/// One device inside a [`CatalogExcerpt`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcerptDevice {
    pub id: String,
    pub label: String,
    pub brand: String,
    pub weights: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Catalog {
    /// Validates and builds a catalog.
    ///
    /// # Errors
    ///
    /// - `Empty` if no devices are given
    /// - `DuplicateDevice` if an id repeats
    /// - `Integrity` if the schema leaves a category undefined, or a profile
    ///   is missing a dimension, declares an unknown one, carries a weight
    ///   outside [0, 1], or targets another schema version
    pub fn load(
        version: impl Into<String>,
        schema: DimensionSchema,
        devices: Vec<DeviceProfile>,
    ) -> Result<Self, CatalogError> {
        validate_schema(&schema)?;

        if devices.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(devices.len());
        for (position, device) in devices.iter().enumerate() {
            validate_device(&schema, device)?;
            if index.insert(device.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateDevice(device.id.clone()));
            }
        }

        tracing::debug!(
            devices = devices.len(),
            schema_version = schema.version,
            "catalog loaded"
        );

        Ok(Self {
            version: version.into(),
            schema,
            devices,
            index,
        })
    }

    /// Parses and validates a YAML catalog document.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::load(document.version, document.schema, document.devices)
    }

    /// Reads and validates a YAML catalog from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Returns the catalog bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        BUILTIN_CATALOG.clone()
    }

    /// All devices in insertion order.
    pub fn get_all(&self) -> &[DeviceProfile] {
        &self.devices
    }

    /// Looks up a device by id.
    pub fn get_by_id(&self, id: &str) -> Result<&DeviceProfile, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.devices[i])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Insertion position of a device, used for stable tie-breaking.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Returns true if the catalog contains the device.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn schema(&self) -> &DimensionSchema {
        &self.schema
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Builds the excerpt of one category for enrichment prompts.
    pub fn excerpt(&self, category: Category) -> CatalogExcerpt {
        let devices = self
            .devices
            .iter()
            .map(|device| ExcerptDevice {
                id: device.id.clone(),
                label: device.label.clone(),
                brand: device.brand.clone(),
                weights: device.sections.get(&category).cloned().unwrap_or_default(),
                note: device.note(category).map(str::to_string),
            })
            .collect();

        CatalogExcerpt { category, devices }
    }
}

fn validate_schema(schema: &DimensionSchema) -> Result<(), CatalogError> {
    for category in Category::all() {
        let dimensions = schema.dimensions(*category);
        if dimensions.is_empty() {
            return Err(CatalogError::integrity(
                "<schema>",
                format!("no dimensions defined for category '{}'", category.id()),
            ));
        }
        for (i, dim) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.key == dim.key) {
                return Err(CatalogError::integrity(
                    "<schema>",
                    format!("dimension '{}.{}' declared twice", category.id(), dim.key),
                ));
            }
        }
    }
    Ok(())
}

fn validate_device(schema: &DimensionSchema, device: &DeviceProfile) -> Result<(), CatalogError> {
    if device.id.trim().is_empty() {
        return Err(CatalogError::integrity("<unnamed>", "device id is empty"));
    }

    if device.schema_version != schema.version {
        return Err(CatalogError::integrity(
            &device.id,
            format!(
                "schema version {} does not match active schema {}",
                device.schema_version, schema.version
            ),
        ));
    }

    for category in Category::all() {
        let section = device.sections.get(category).ok_or_else(|| {
            CatalogError::integrity(&device.id, format!("missing section '{}'", category.id()))
        })?;

        for dim in schema.dimensions(*category) {
            let weight = section.get(&dim.key).ok_or_else(|| {
                CatalogError::integrity(
                    &device.id,
                    format!("missing dimension '{}.{}'", category.id(), dim.key),
                )
            })?;

            if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
                return Err(CatalogError::integrity(
                    &device.id,
                    format!(
                        "weight for '{}.{}' out of range: {}",
                        category.id(),
                        dim.key,
                        weight
                    ),
                ));
            }
        }

        if let Some(unknown) = section.keys().find(|k| !schema.contains(*category, k)) {
            return Err(CatalogError::integrity(
                &device.id,
                format!("undeclared dimension '{}.{}'", category.id(), unknown),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A one-dimension-per-category schema, convenient for small fixtures.
    pub fn minimal_schema() -> DimensionSchema {
        DimensionSchema::new(1)
            .with_dimension(Category::Cost, "upfront", "Low upfront cost")
            .with_dimension(Category::Lifestyle, "travel", "Travel friendliness")
            .with_dimension(Category::Lifestyle, "water_resistance", "Water resistance")
            .with_dimension(Category::Algorithm, "automation", "Automation")
            .with_dimension(Category::EaseToStart, "quick_setup", "Quick setup")
            .with_dimension(Category::Complexity, "phone_control", "Phone control")
            .with_dimension(Category::Support, "manufacturer_support", "Support line")
    }

    /// A device declaring `fill` for every dimension of [`minimal_schema`].
    pub fn filled_device(id: &str, fill: f64) -> DeviceProfile {
        let schema = minimal_schema();
        let mut device = DeviceProfile::new(id, "Acme", id.to_uppercase(), 1);
        for category in Category::all() {
            for dim in schema.dimensions(*category) {
                device = device.with_weight(*category, dim.key.clone(), fill);
            }
        }
        device
    }
}
