use serde::Serialize;

/// Derives the body-mass index from weight (kg) and height (m),
/// rounded to two decimals. Non-positive inputs yield no value.
pub fn imc(weight_kg: f64, height_m: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_m <= 0.0 {
        return None;
    }
    Some((weight_kg / (height_m * height_m) * 100.0).round() / 100.0)
}

/// Severity band for a BMI value. Band boundaries are inclusive on the
/// lower end: 18.5 is Normal, 25 is Sobrepeso, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImcCategory {
    NoCalculado,
    BajoPeso,
    Normal,
    Sobrepeso,
    ObesidadI,
    ObesidadII,
    ObesidadIII,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImcClassification {
    pub category: ImcCategory,
    pub label: &'static str,
}

pub fn classify(imc: Option<f64>) -> ImcClassification {
    let category = match imc {
        None => ImcCategory::NoCalculado,
        Some(v) if v < 18.5 => ImcCategory::BajoPeso,
        Some(v) if v < 25.0 => ImcCategory::Normal,
        Some(v) if v < 30.0 => ImcCategory::Sobrepeso,
        Some(v) if v < 35.0 => ImcCategory::ObesidadI,
        Some(v) if v < 40.0 => ImcCategory::ObesidadII,
        Some(_) => ImcCategory::ObesidadIII,
    };
    ImcClassification {
        category,
        label: category.label(),
    }
}

impl ImcCategory {
    pub fn label(self) -> &'static str {
        match self {
            ImcCategory::NoCalculado => "No calculado",
            ImcCategory::BajoPeso => "Bajo peso",
            ImcCategory::Normal => "Normal",
            ImcCategory::Sobrepeso => "Sobrepeso",
            ImcCategory::ObesidadI => "Obesidad I",
            ImcCategory::ObesidadII => "Obesidad II",
            ImcCategory::ObesidadIII => "Obesidad III",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_imc_is_not_calculated() {
        assert_eq!(classify(None).label, "No calculado");
    }

    #[test]
    fn band_boundaries_are_lower_inclusive() {
        assert_eq!(classify(Some(17.5)).label, "Bajo peso");
        assert_eq!(classify(Some(18.4)).label, "Bajo peso");
        assert_eq!(classify(Some(18.5)).label, "Normal");
        assert_eq!(classify(Some(24.9)).label, "Normal");
        assert_eq!(classify(Some(25.0)).label, "Sobrepeso");
        assert_eq!(classify(Some(29.9)).label, "Sobrepeso");
        assert_eq!(classify(Some(30.0)).label, "Obesidad I");
        assert_eq!(classify(Some(34.9)).label, "Obesidad I");
        assert_eq!(classify(Some(35.0)).label, "Obesidad II");
        assert_eq!(classify(Some(39.9)).label, "Obesidad II");
        assert_eq!(classify(Some(40.0)).label, "Obesidad III");
        assert_eq!(classify(Some(52.3)).label, "Obesidad III");
    }

    #[test]
    fn categories_track_labels() {
        assert_eq!(classify(Some(22.0)).category, ImcCategory::Normal);
        assert_eq!(classify(None).category, ImcCategory::NoCalculado);
    }

    #[test]
    fn imc_derivation_rounds_to_two_decimals() {
        assert_eq!(imc(70.0, 1.75), Some(22.86));
        assert_eq!(imc(80.0, 1.80), Some(24.69));
        assert_eq!(imc(0.0, 1.75), None);
        assert_eq!(imc(70.0, 0.0), None);
    }
}
