//! GLC2000 land-cover class names.

const GLC2000_CLASSES: &[(i64, &str)] = &[
    (2, "Broadleaf Deciduous Forest (Closed)"),
    (4, "Needleleaf Evergreen Forest"),
    (6, "Mixed Forest"),
    (11, "Evergreen Shrub Cover"),
    (12, "Deciduous Shrub Cover"),
    (13, "Herbaceous Cover"),
    (14, "Sparse Herb/Shrub"),
    (15, "Flooded Herb/Shrub"),
    (16, "Cultivated Areas"),
    (18, "Cropland Mosaic"),
    (20, "Water Bodies"),
];

pub fn land_cover_name(code: i64) -> Option<&'static str> {
    GLC2000_CLASSES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Display label; unknown codes render as `Unknown ({code})`.
pub fn land_cover_label(code: Option<i64>) -> String {
    match code {
        Some(c) => land_cover_name(c)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown ({c})")),
        None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::land_cover_label;

    #[test]
    fn known_unknown_and_missing() {
        assert_eq!(land_cover_label(Some(16)), "Cultivated Areas");
        assert_eq!(land_cover_label(Some(99)), "Unknown (99)");
        assert_eq!(land_cover_label(None), "Unknown");
    }
}
