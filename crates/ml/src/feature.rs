//! Features for the CRF: named observations whose string key indexes the
//! model's feature table. String-valued features key on `name_value`;
//! integer and boolean features key on the bare name.

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Int { name: &'static str, value: i32 },
    Str { name: &'static str, value: String },
    Bool { name: &'static str, value: bool },
}

impl Feature {
    pub fn key(&self) -> String {
        match self {
            Feature::Int { name, .. } => (*name).to_string(),
            Feature::Str { name, value } => format!("{name}_{value}"),
            Feature::Bool { name, .. } => (*name).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_features_key_on_value() {
        let f = Feature::Str {
            name: "LV_POINT",
            value: "TERM_1".into(),
        };
        assert_eq!(f.key(), "LV_POINT_TERM_1");
        let f = Feature::Int {
            name: "LV_DISTANCE",
            value: -3,
        };
        assert_eq!(f.key(), "LV_DISTANCE");
        let f = Feature::Bool {
            name: "LV_IS_CLOSEST",
            value: true,
        };
        assert_eq!(f.key(), "LV_IS_CLOSEST");
    }
}
