//! Category label normalization.
//!
//! IMDb names some categories with compound labels ("Violence & Gore",
//! "Alcohol, Drugs & Smoking") and has used the short forms on other
//! layouts. Rules below fold them onto one key. Adjusting to new upstream
//! labels means editing [`LABEL_RULES`] and bumping [`LABEL_RULES_VERSION`].
//!
//! | version | change |
//! |---|---|
//! | 1 | `& Gore`, `& Nudity`, `, Drugs & Smoking` suffixes |

pub const LABEL_RULES_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelRule {
    pub suffix: &'static str,
    pub replacement: &'static str,
}

/// Applied in order, each at most once.
pub static LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        suffix: " & Gore",
        replacement: "",
    },
    LabelRule {
        suffix: " & Nudity",
        replacement: "",
    },
    LabelRule {
        suffix: ", Drugs & Smoking",
        replacement: "",
    },
];

pub fn normalize_label(label: &str) -> String {
    LABEL_RULES
        .iter()
        .fold(label.to_string(), |label, rule| match label.strip_suffix(rule.suffix) {
            Some(stem) => format!("{}{}", stem, rule.replacement),
            None => label,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_suffixes() {
        assert_eq!(normalize_label("Violence & Gore"), "Violence");
        assert_eq!(normalize_label("Sex & Nudity"), "Sex");
        assert_eq!(normalize_label("Alcohol, Drugs & Smoking"), "Alcohol");
    }

    #[test]
    fn leaves_other_labels_alone() {
        assert_eq!(normalize_label("Profanity"), "Profanity");
        assert_eq!(normalize_label("Frightening & Intense Scenes"), "Frightening & Intense Scenes");
        assert_eq!(normalize_label("Gore & Violence"), "Gore & Violence");
    }

    #[test]
    fn only_strips_suffixes() {
        assert_eq!(normalize_label("Nudity & Gore Notes"), "Nudity & Gore Notes");
    }
}
