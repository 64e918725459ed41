use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

/// The fixed locale registry. The selected code only affects the language
/// directive sent upstream, never any local formatting.
pub static SUPPORTED_LANGUAGES: Lazy<Vec<Language>> = Lazy::new(|| {
    vec![
        Language { code: "en", name: "English", native_name: "English" },
        Language { code: "hi", name: "Hindi", native_name: "हिन्दी" },
        Language { code: "bn", name: "Bengali", native_name: "বাংলা" },
        Language { code: "te", name: "Telugu", native_name: "తెలుగు" },
        Language { code: "mr", name: "Marathi", native_name: "मराठी" },
        Language { code: "ta", name: "Tamil", native_name: "தமிழ்" }
    ]
});

pub fn find_language(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|language| language.code == code)
}

pub fn is_supported(code: &str) -> bool {
    find_language(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_six_locales() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 6);
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(find_language("ta").map(|l| l.name), Some("Tamil"));
        assert!(is_supported("en"));
        assert!(!is_supported("fr"));
    }
}
