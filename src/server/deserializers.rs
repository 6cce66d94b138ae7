use serde::{Deserialize, Deserializer};

pub fn default_pageno() -> u32 {
    1
}

// Bad or missing page numbers fall back to the first page instead of
// failing the whole request.
pub fn deserialize_pageno<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or_else(default_pageno))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default = "default_pageno", deserialize_with = "deserialize_pageno")]
        pageno: u32,
    }

    #[test]
    fn valid_page_number_is_parsed() {
        let params: Params = serde_json::from_value(json!({"pageno": "7"})).unwrap();
        assert_eq!(params.pageno, 7);
    }

    #[test]
    fn missing_page_number_defaults_to_one() {
        let params: Params = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.pageno, 1);
    }

    #[test]
    fn garbage_and_zero_fall_back_to_one() {
        let params: Params = serde_json::from_value(json!({"pageno": "abc"})).unwrap();
        assert_eq!(params.pageno, 1);
        let params: Params = serde_json::from_value(json!({"pageno": "0"})).unwrap();
        assert_eq!(params.pageno, 1);
    }
}
