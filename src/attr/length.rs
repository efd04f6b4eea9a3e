use super::number::split_number;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Number,
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Em,
    Ex,
    Percent,
}

/// A length as written, before it is resolved against a viewport and font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn is_percent(self) -> bool {
        self.unit == LengthUnit::Percent
    }

    /// Resolve to user units. `reference` is the viewport extent percentages refer to.
    pub fn normalize(self, dpi: f64, reference: f64, font_size: f64) -> f64 {
        let v = self.value;
        match self.unit {
            LengthUnit::Number | LengthUnit::Px => v,
            LengthUnit::Pt => v * dpi / 72.0,
            LengthUnit::Pc => v * dpi / 6.0,
            LengthUnit::In => v * dpi,
            LengthUnit::Cm => v * dpi / 2.54,
            LengthUnit::Mm => v * dpi / 25.4,
            LengthUnit::Em => v * font_size,
            LengthUnit::Ex => v * font_size / 2.0,
            LengthUnit::Percent => v * reference / 100.0,
        }
    }
}

pub fn parse_length(s: &str) -> Option<Length> {
    let (value, rest) = split_number(s.trim())?;
    let unit = match rest.trim_end() {
        "" => LengthUnit::Number,
        "px" => LengthUnit::Px,
        "pt" => LengthUnit::Pt,
        "pc" => LengthUnit::Pc,
        "in" => LengthUnit::In,
        "cm" => LengthUnit::Cm,
        "mm" => LengthUnit::Mm,
        "em" => LengthUnit::Em,
        "ex" => LengthUnit::Ex,
        "%" => LengthUnit::Percent,
        _ => return None,
    };
    Some(Length::new(value, unit))
}

pub fn parse_normalized_length(s: &str, dpi: f64, reference: f64, font_size: f64) -> Option<f64> {
    parse_length(s).map(|l| l.normalize(dpi, reference, font_size))
}

#[cfg(test)]
#[path = "../../tests/unit/attr/length.rs"]
mod tests;
