//! Cue languages and their phrases

use std::fmt;

/// Languages cues can be spoken in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Language {
    #[default]
    English,
    Spanish,
    Portuguese,
    French,
    German,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::Portuguese,
        Language::French,
        Language::German,
    ];

    /// Parse a language tag such as `"en"`, `"es-MX"` or `"pt_BR"` (case-insensitive).
    /// Only the primary subtag is considered.
    pub fn from_tag(tag: &str) -> Option<Language> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        match primary.as_str() {
            "en" | "english" => Some(Language::English),
            "es" | "spanish" | "español" => Some(Language::Spanish),
            "pt" | "portuguese" | "português" => Some(Language::Portuguese),
            "fr" | "french" | "français" => Some(Language::French),
            "de" | "german" | "deutsch" => Some(Language::German),
            _ => None,
        }
    }

    /// Primary language subtag
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Portuguese => "pt",
            Language::French => "fr",
            Language::German => "de",
        }
    }

    fn starting_word(&self) -> &'static str {
        match self {
            Language::English => "Starting",
            Language::Spanish => "Comenzando",
            Language::Portuguese => "Começando",
            Language::French => "On commence",
            Language::German => "Los geht's",
        }
    }

    fn set_word(&self) -> &'static str {
        match self {
            Language::English => "Set",
            Language::Spanish => "Serie",
            Language::Portuguese | Language::French => "Série",
            Language::German => "Satz",
        }
    }

    /// Opening cue, e.g. "Set 2. Starting squat"
    pub fn starting(&self, exercise_name: &str, set_number: Option<u32>) -> String {
        let mut text = String::new();
        if let Some(n) = set_number {
            text.push_str(&format!("{} {}. ", self.set_word(), n));
        }
        text.push_str(self.starting_word());
        let exercise_name = exercise_name.trim();
        if !exercise_name.is_empty() {
            text.push(' ');
            text.push_str(exercise_name);
        }
        text
    }

    pub fn rep(&self, rep_number: u32) -> String {
        let word = match self {
            Language::English => "Rep",
            Language::Spanish => "Repetición",
            Language::Portuguese => "Repetição",
            Language::French => "Répétition",
            Language::German => "Wiederholung",
        };
        format!("{} {}", word, rep_number)
    }

    pub fn countdown(&self, seconds_left: u32) -> String {
        seconds_left.to_string()
    }

    pub fn hold(&self) -> &'static str {
        match self {
            Language::English => "Hold",
            Language::Spanish => "Mantén",
            Language::Portuguese => "Segura",
            Language::French => "Tenez",
            Language::German => "Halten",
        }
    }

    pub fn up(&self) -> &'static str {
        match self {
            Language::English => "Up",
            Language::Spanish => "Sube",
            Language::Portuguese => "Sobe",
            Language::French => "Montez",
            Language::German => "Hoch",
        }
    }

    pub fn squeeze(&self) -> &'static str {
        match self {
            Language::English => "Squeeze",
            Language::Spanish => "Aprieta",
            Language::Portuguese => "Contrai",
            Language::French => "Contractez",
            Language::German => "Anspannen",
        }
    }

    pub fn last_rep(&self) -> &'static str {
        match self {
            Language::English => "Last one, push!",
            Language::Spanish => "¡Última, empuja!",
            Language::Portuguese => "Última, força!",
            Language::French => "Dernière, poussez !",
            Language::German => "Letzte, drück!",
        }
    }

    pub fn set_complete(&self) -> &'static str {
        match self {
            Language::English => "Set complete",
            Language::Spanish => "Serie completa",
            Language::Portuguese => "Série completa",
            Language::French => "Série terminée",
            Language::German => "Satz beendet",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_tag("en"), Some(Language::English));
        assert_eq!(Language::from_tag("es-MX"), Some(Language::Spanish));
        assert_eq!(Language::from_tag("pt_BR"), Some(Language::Portuguese));
        assert_eq!(Language::from_tag("FR"), Some(Language::French));
        assert_eq!(Language::from_tag("de-AT"), Some(Language::German));
        assert_eq!(Language::from_tag("ja"), None);
        assert_eq!(Language::from_tag(""), None);
    }

    #[test]
    fn test_tag_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_tag(language.tag()), Some(language));
        }
    }

    #[test]
    fn test_starting_phrase() {
        assert_eq!(Language::English.starting("squat", None), "Starting squat");
        assert_eq!(
            Language::English.starting("squat", Some(2)),
            "Set 2. Starting squat"
        );
        assert_eq!(Language::Spanish.starting("  ", None), "Comenzando");
    }

    #[test]
    fn test_rep_phrase() {
        assert_eq!(Language::English.rep(2), "Rep 2");
        assert_eq!(Language::Spanish.rep(3), "Repetición 3");
        assert_eq!(Language::Portuguese.rep(3), "Repetição 3");
    }
}
