use serde::Serialize;

/// How a language writes personal names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrder {
    /// Family name first, written without a separator (鲁迅).
    FamilyFirstJoined,
    /// Family name first, separated by a space (Nguyễn Du).
    FamilyFirstSpaced,
    /// Given name first, separated by a space (Pearl Buck).
    GivenFirst,
}

impl NameOrder {
    pub fn for_language(name_lang: &str) -> Self {
        let primary = name_lang
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" | "ja" | "ko" => Self::FamilyFirstJoined,
            "hu" | "vi" => Self::FamilyFirstSpaced,
            _ => Self::GivenFirst,
        }
    }
}

/// A person's name parts ordered the way their language writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameTuple {
    pub first: String,
    pub second: String,
    #[serde(skip)]
    pub separator: &'static str,
}

impl NameTuple {
    /// The full name as it would appear as a label.
    pub fn label(&self) -> String {
        match (self.first.is_empty(), self.second.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.first.clone(),
            (true, false) => self.second.clone(),
            (false, false) => format!("{}{}{}", self.first, self.separator, self.second),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }
}

pub fn order_name_by_language(family_name: &str, first_name: &str, name_lang: &str) -> NameTuple {
    let family = family_name.trim().to_string();
    let given = first_name.trim().to_string();
    match NameOrder::for_language(name_lang) {
        NameOrder::FamilyFirstJoined => NameTuple { first: family, second: given, separator: "" },
        NameOrder::FamilyFirstSpaced => NameTuple { first: family, second: given, separator: " " },
        NameOrder::GivenFirst => NameTuple { first: given, second: family, separator: " " },
    }
}
