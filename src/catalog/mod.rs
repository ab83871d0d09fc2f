//! Built-in material defaults.
//!
//! Used when the vendor database has no entry for a brand/material pair. The
//! order of `DEFAULTS` is the numbering the operator sees, so it must not change
//! between runs.

use crate::domain::MaterialSpec;

/// Typical settings for one generic material type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultMaterial {
    pub name: &'static str,
    pub spool_weight: u32,
    pub extruder_temp: u32,
    pub bed_temp: u32,
    pub density: f64,
    pub description: &'static str,
}

impl DefaultMaterial {
    pub fn spec(&self) -> MaterialSpec {
        MaterialSpec {
            spool_weight: self.spool_weight,
            extruder_temp: self.extruder_temp,
            bed_temp: self.bed_temp,
            density: self.density,
            description: self.description.to_string(),
        }
    }
}

static DEFAULTS: [DefaultMaterial; 7] = [
    DefaultMaterial {
        name: "PLA",
        spool_weight: 250,
        extruder_temp: 210,
        bed_temp: 60,
        density: 1.24,
        description: "Generic PLA",
    },
    DefaultMaterial {
        name: "PETG",
        spool_weight: 250,
        extruder_temp: 240,
        bed_temp: 80,
        density: 1.27,
        description: "Generic PETG",
    },
    DefaultMaterial {
        name: "ABS",
        spool_weight: 250,
        extruder_temp: 250,
        bed_temp: 100,
        density: 1.04,
        description: "Generic ABS",
    },
    DefaultMaterial {
        name: "ASA",
        spool_weight: 250,
        extruder_temp: 255,
        bed_temp: 100,
        density: 1.07,
        description: "Generic ASA",
    },
    DefaultMaterial {
        name: "TPU",
        spool_weight: 250,
        extruder_temp: 225,
        bed_temp: 50,
        density: 1.20,
        description: "Generic TPU",
    },
    DefaultMaterial {
        name: "WOOD",
        spool_weight: 250,
        extruder_temp: 210,
        bed_temp: 60,
        density: 1.28,
        description: "Generic wood-fill PLA",
    },
    DefaultMaterial {
        name: "SILK",
        spool_weight: 250,
        extruder_temp: 215,
        bed_temp: 60,
        density: 1.24,
        description: "Generic silk PLA",
    },
];

/// Returned when a material matches no catalog entry.
pub const GENERIC: DefaultMaterial = DefaultMaterial {
    name: "Unknown",
    spool_weight: 250,
    extruder_temp: 220,
    bed_temp: 60,
    density: 1.24,
    description: "Generic filament defaults",
};

/// All catalog entries in display order.
pub fn defaults() -> &'static [DefaultMaterial] {
    &DEFAULTS
}

/// Infer the catalog material for a product name such as `PLA+` or `PETG-CF`.
///
/// Checked in catalog order, so `SILK PLA` resolves to `PLA`.
pub fn base_material(name: &str) -> Option<&'static str> {
    let upper = name.to_uppercase();
    DEFAULTS
        .iter()
        .find(|entry| upper.contains(entry.name))
        .map(|entry| entry.name)
}

/// Catalog entry for a material name, or `GENERIC` when nothing matches.
pub fn by_material(name: &str) -> &'static DefaultMaterial {
    let trimmed = name.trim();
    if let Some(entry) = DEFAULTS.iter().find(|e| e.name.eq_ignore_ascii_case(trimmed)) {
        return entry;
    }
    match base_material(trimmed) {
        Some(base) => DEFAULTS.iter().find(|e| e.name == base).unwrap_or(&GENERIC),
        None => &GENERIC,
    }
}
