//! Annotation texts written into a row's `note`.
//!
//! Every message ends with `By <bot>.` so reviewers can tell automated edits
//! from original data.

const SKIP_ADVICE: &str = "If you are sure this row is correct, the person probably shares a name \
with someone in Wikidata: put \"skip\" in the note column of this row and run again.";

fn quoted_list(fields: &[String]) -> String {
    format!("\"{}\"", fields.join(", "))
}

pub fn overwritten_from_reference(fields: &[String], bot: &str) -> String {
    format!("Fields {} overwritten with reference data. By {bot}.", quoted_list(fields))
}

pub fn updated(fields: &[String], bot: &str) -> String {
    if fields.is_empty() {
        format!("Checked against Wikidata, no fields updated. By {bot}.")
    } else {
        format!("Fields {} updated. By {bot}.", quoted_list(fields))
    }
}

pub fn no_match(fields: &[String], bot: &str) -> String {
    if fields.is_empty() {
        format!("No match in Wikidata. By {bot}.")
    } else {
        format!("Fields {} updated. No match in Wikidata. By {bot}.", quoted_list(fields))
    }
}

pub fn not_found(wikidata_id: &str, bot: &str) -> String {
    format!("`wikidata_id` {wikidata_id} not found in Wikidata. By {bot}.")
}

pub fn id_space_warning(bot: &str) -> String {
    format!("Warning: It is better to update all person_id in the database. By {bot}.")
}

pub fn missing_reference_key(person_id: &str, name_lang: &str, bot: &str) -> String {
    format!(
        "Error: `person_id` {person_id} has no reference row with `name_lang` \"{name_lang}\". \
         Please check. By {bot}."
    )
}

pub fn wikidata_mismatch(person_id: &str, expected: Option<&str>, bot: &str) -> String {
    format!(
        "Error: `wikidata_id` does not match reference data for `person_id` {person_id} \
         (reference has \"{}\"). Please check. By {bot}.",
        expected.unwrap_or("")
    )
}

pub fn wikidata_collision(wikidata_id: &str, owner: &str, bot: &str) -> String {
    format!(
        "Error: `wikidata_id` {wikidata_id} already exists in reference data under `person_id` \
         {owner}, but the `person_id` does not match. Please check. {SKIP_ADVICE} By {bot}."
    )
}

pub fn name_lookup_collision(wikidata_id: &str, owner: &str, bot: &str) -> String {
    format!(
        "Error: `wikidata_id` {wikidata_id} queried by family_name, first_name, name_lang already \
         exists in reference data under `person_id` {owner}, but this row's `person_id` does not \
         match. Please check your data carefully. {SKIP_ADVICE} By {bot}."
    )
}
