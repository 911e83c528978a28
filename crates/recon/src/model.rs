use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The twelve fields compared between a candidate and its reference record.
///
/// Order matters: it is the order in which overwritten fields are listed in
/// annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FamilyName,
    FirstName,
    NameLang,
    Sex,
    BirthYear,
    DeathYear,
    PlaceOfBirth,
    Created,
    CreatedBy,
    LastModified,
    LastModifiedBy,
    Note,
}

impl Field {
    pub const COMPARED: [Field; 12] = [
        Field::FamilyName,
        Field::FirstName,
        Field::NameLang,
        Field::Sex,
        Field::BirthYear,
        Field::DeathYear,
        Field::PlaceOfBirth,
        Field::Created,
        Field::CreatedBy,
        Field::LastModified,
        Field::LastModifiedBy,
        Field::Note,
    ];

    /// CSV column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::FamilyName => "family_name",
            Self::FirstName => "first_name",
            Self::NameLang => "name_lang",
            Self::Sex => "sex",
            Self::BirthYear => "birthyear",
            Self::DeathYear => "deathyear",
            Self::PlaceOfBirth => "place_of_birth",
            Self::Created => "created",
            Self::CreatedBy => "created_by",
            Self::LastModified => "last_modified",
            Self::LastModifiedBy => "last_modified_by",
            Self::Note => "note",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::COMPARED.iter().copied().find(|f| f.column() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

pub const PERSON_ID_COLUMN: &str = "person_id";
pub const WIKIDATA_ID_COLUMN: &str = "wikidata_id";

/// Every column a person table is expected to carry, in canonical order.
pub const PERSON_COLUMNS: [&str; 14] = [
    PERSON_ID_COLUMN,
    "family_name",
    "first_name",
    "name_lang",
    "sex",
    "birthyear",
    "deathyear",
    "place_of_birth",
    WIKIDATA_ID_COLUMN,
    "created",
    "created_by",
    "last_modified",
    "last_modified_by",
    "note",
];

// ---------------------------------------------------------------------------
// Person record
// ---------------------------------------------------------------------------

/// One row of a person table, candidate or reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub person_id: Option<String>,
    pub wikidata_id: Option<String>,
    pub family_name: String,
    pub first_name: String,
    pub name_lang: String,
    pub sex: String,
    pub birthyear: String,
    pub deathyear: String,
    pub place_of_birth: String,
    pub created: String,
    pub created_by: String,
    pub last_modified: String,
    pub last_modified_by: String,
    pub note: String,
    /// Columns this crate does not interpret, in table order.
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl PersonRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FamilyName => &self.family_name,
            Field::FirstName => &self.first_name,
            Field::NameLang => &self.name_lang,
            Field::Sex => &self.sex,
            Field::BirthYear => &self.birthyear,
            Field::DeathYear => &self.deathyear,
            Field::PlaceOfBirth => &self.place_of_birth,
            Field::Created => &self.created,
            Field::CreatedBy => &self.created_by,
            Field::LastModified => &self.last_modified,
            Field::LastModifiedBy => &self.last_modified_by,
            Field::Note => &self.note,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FamilyName => self.family_name = value,
            Field::FirstName => self.first_name = value,
            Field::NameLang => self.name_lang = value,
            Field::Sex => self.sex = value,
            Field::BirthYear => self.birthyear = value,
            Field::DeathYear => self.deathyear = value,
            Field::PlaceOfBirth => self.place_of_birth = value,
            Field::Created => self.created = value,
            Field::CreatedBy => self.created_by = value,
            Field::LastModified => self.last_modified = value,
            Field::LastModifiedBy => self.last_modified_by = value,
            Field::Note => self.note = value,
        }
    }

    /// A row whose note reads "skip" is left alone entirely.
    pub fn is_skipped(&self) -> bool {
        self.note.trim().eq_ignore_ascii_case("skip")
    }

    /// Append an annotation to `note`. Existing content is never replaced.
    pub fn annotate(&mut self, message: &str) {
        if self.note.is_empty() {
            self.note = message.to_string();
        } else {
            self.note.push(' ');
            self.note.push_str(message);
        }
    }

    pub fn has_person_id(&self) -> bool {
        self.person_id.is_some()
    }

    pub fn has_wikidata_id(&self) -> bool {
        self.wikidata_id.is_some()
    }

    /// Cell values in [`PERSON_COLUMNS`] order.
    pub fn values(&self) -> Vec<&str> {
        PERSON_COLUMNS
            .iter()
            .map(|c| self.column_value(c).unwrap_or(""))
            .collect()
    }

    /// Value of a known column, `None` for columns outside [`PERSON_COLUMNS`].
    pub fn column_value(&self, column: &str) -> Option<&str> {
        match column {
            PERSON_ID_COLUMN => Some(self.person_id.as_deref().unwrap_or("")),
            WIKIDATA_ID_COLUMN => Some(self.wikidata_id.as_deref().unwrap_or("")),
            other => Field::from_column(other).map(|f| self.get(f)),
        }
    }

    /// Assign a known column from a raw cell. Returns false for unknown columns.
    pub fn set_column(&mut self, column: &str, value: &str) -> bool {
        match column {
            PERSON_ID_COLUMN => {
                self.person_id = normalize_id(value);
                true
            }
            WIKIDATA_ID_COLUMN => {
                self.wikidata_id = normalize_id(value);
                true
            }
            other => match Field::from_column(other) {
                Some(field) => {
                    self.set(field, value);
                    true
                }
                None => false,
            },
        }
    }
}

/// Blank identifier cells mean "absent".
pub fn normalize_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Person id
// ---------------------------------------------------------------------------

/// A parsed local identifier: two-letter prefix plus a numeric suffix.
///
/// `width` keeps the zero padding of the suffix so minted ids line up with
/// the existing ones (`AG0099` → `AG0100`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonId {
    pub prefix: String,
    pub number: u64,
    pub width: usize,
}

/// Why a string is not a usable [`PersonId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonIdError {
    /// Not `<2 letters><digits>`.
    Malformed,
    /// Well-formed, but the suffix does not fit the counter.
    Overflow,
}

impl PersonId {
    pub fn parse(raw: &str) -> Result<Self, PersonIdError> {
        let raw = raw.trim();
        let prefix: String = raw.chars().take(2).collect();
        if prefix.chars().count() != 2 || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PersonIdError::Malformed);
        }
        let digits = &raw[prefix.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PersonIdError::Malformed);
        }
        // Only digits remain, so the parse can fail on range alone
        let number = digits.parse().map_err(|_| PersonIdError::Overflow)?;
        Ok(Self {
            prefix,
            number,
            width: digits.len(),
        })
    }

    /// The identifier following this one, `None` once the counter is spent.
    pub fn successor(&self) -> Option<Self> {
        Some(Self {
            prefix: self.prefix.clone(),
            number: self.number.checked_add(1)?,
            width: self.width,
        })
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.prefix, self.number, width = self.width)
    }
}

impl PartialOrd for PersonId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PersonId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.prefix.cmp(&other.prefix))
            .then_with(|| self.width.cmp(&other.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_case_insensitive() {
        let mut r = PersonRecord::default();
        for note in ["skip", "Skip", "SKIP", " skip "] {
            r.note = note.into();
            assert!(r.is_skipped(), "{note:?}");
        }
        r.note = "skipped".into();
        assert!(!r.is_skipped());
    }

    #[test]
    fn annotate_appends() {
        let mut r = PersonRecord::default();
        r.annotate("first.");
        assert_eq!(r.note, "first.");
        r.annotate("second.");
        assert_eq!(r.note, "first. second.");
    }

    #[test]
    fn blank_ids_are_absent() {
        let mut r = PersonRecord::default();
        assert!(r.set_column("person_id", "   "));
        assert_eq!(r.person_id, None);
        assert!(r.set_column("wikidata_id", " Q42 "));
        assert_eq!(r.wikidata_id.as_deref(), Some("Q42"));
        assert!(!r.set_column("alias", "x"));
    }

    #[test]
    fn person_id_parse_and_order() {
        let a = PersonId::parse("AG0099").unwrap();
        assert_eq!(a.prefix, "AG");
        assert_eq!(a.number, 99);
        assert_eq!(a.successor().unwrap().to_string(), "AG0100");

        let b = PersonId::parse("AG120").unwrap();
        assert!(b > a);

        for bad in ["A1", "AG", "AGx12", "12345"] {
            assert_eq!(PersonId::parse(bad), Err(PersonIdError::Malformed), "{bad}");
        }
    }

    #[test]
    fn successor_grows_past_padding() {
        let id = PersonId::parse("AG9999").unwrap();
        assert_eq!(id.successor().unwrap().to_string(), "AG10000");
    }

    #[test]
    fn long_suffixes_count_past_u32() {
        let id = PersonId::parse("AG4294967295").unwrap();
        assert_eq!(id.successor().unwrap().to_string(), "AG4294967296");
        assert_eq!(PersonId::parse("AG99999999999").unwrap().number, 99_999_999_999);
    }

    #[test]
    fn suffix_too_wide_for_counter() {
        assert_eq!(
            PersonId::parse("AG99999999999999999999"),
            Err(PersonIdError::Overflow)
        );
        let last = PersonId::parse(&format!("AG{}", u64::MAX)).unwrap();
        assert!(last.successor().is_none());
    }

    #[test]
    fn field_columns_round_trip() {
        for f in Field::COMPARED {
            assert_eq!(Field::from_column(f.column()), Some(f));
        }
        assert_eq!(Field::from_column("person_id"), None);
    }
}
